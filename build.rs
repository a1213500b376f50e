fn main() {
    // On macOS, optionally link against the Accelerate framework for BLAS/LAPACK
    #[cfg(target_os = "macos")]
    {
        if std::env::var_os("CARGO_FEATURE_ACCELERATE").is_some() {
            println!("cargo:rustc-link-lib=framework=Accelerate");
        }
    }
}

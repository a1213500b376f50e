//! Demonstration of partitioned-system interconnections
//!
//! Builds a small loop around a first-order plant with a performance
//! channel (partition 1) and a measured output (partition 2), then closes
//! a static feedback loop and prints the resulting realization and its
//! closed-loop poles.

use ndarray::{arr2, Array2};
use ndarray_linalg::Eig;
use num_complex::Complex;
use partitioned_ss::ab::{feedback, hcat_1, series};
use partitioned_ss::{Blocks, PartitionedSystem, StateSpace, TimeDomain};

fn print_matrix(name: &str, m: &Array2<f64>) {
    println!("{} =", name);
    for i in 0..m.nrows() {
        print!("  [");
        for j in 0..m.ncols() {
            print!("{:9.4}", m[(i, j)]);
        }
        println!(" ]");
    }
}

fn main() {
    println!("=== Partitioned Interconnection Demonstration ===\n");

    // Plant: dx/dt = -x + w + u
    //        z = x,  y = x
    let plant = match PartitionedSystem::new(
        Blocks {
            a: arr2(&[[-1.0]]),
            b1: arr2(&[[1.0]]),
            b2: arr2(&[[1.0]]),
            c1: arr2(&[[1.0]]),
            c2: arr2(&[[1.0]]),
            d11: arr2(&[[0.0]]),
            d12: arr2(&[[0.0]]),
            d21: arr2(&[[0.0]]),
            d22: arr2(&[[0.0]]),
        },
        TimeDomain::Continuous,
    ) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error building plant: {}", e);
            return;
        }
    };
    println!("Plant:\n{}", plant);

    // Actuator: 2 / (s + 2), all channels in partition 1
    let actuator = StateSpace::new(
        arr2(&[[-2.0]]),
        arr2(&[[2.0]]),
        arr2(&[[1.0]]),
        arr2(&[[0.0]]),
        TimeDomain::Continuous,
    )
    .map(PartitionedSystem::from);

    let controller = StateSpace::static_gain(arr2(&[[3.0]]), TimeDomain::Continuous)
        .map(PartitionedSystem::from);

    let (actuator, controller) = match (actuator, controller) {
        (Ok(a), Ok(k)) => (a, k),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error building loop components: {}", e);
            return;
        }
    };

    // Actuator drives the plant's partition-1 input
    let open = match series(&plant, &actuator) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Series interconnection failed: {}", e);
            return;
        }
    };
    println!(
        "Open loop: nx = {}, nu1 = {}, ny1 = {}, nu2 = {}, ny2 = {}",
        open.nx(),
        open.nu1(),
        open.ny1(),
        open.nu2(),
        open.ny2()
    );

    match feedback(&open, &controller) {
        Ok(closed) => {
            println!("\n=== Closed Loop ===");
            let blocks = closed.blocks();
            print_matrix("A", &blocks.a);
            print_matrix("B1", &blocks.b1);
            print_matrix("C1", &blocks.c1);

            if let Ok((poles, _)) = blocks.a.eig() {
                println!("\nClosed-loop poles:");
                for pole in poles.iter() {
                    let p: Complex<f64> = *pole;
                    println!("  λ = {:.4} {:+.4}i", p.re, p.im);
                }
            }

            match closed.state_space().frequency_response(0.0) {
                Ok(g) => println!("\nDC gain r -> z: {:.4}", g[(0, 0)].re),
                Err(e) => eprintln!("Frequency response failed: {}", e),
            }
        }
        Err(e) => eprintln!("Feedback interconnection failed: {}", e),
    }

    // Two copies of the plant summed into one performance output
    match hcat_1(&[plant.clone(), plant]) {
        Ok(cat) => println!(
            "\nhcat_1 of two plants: nu1 = {}, ny1 = {}, nx = {}",
            cat.nu1(),
            cat.ny1(),
            cat.nx()
        ),
        Err(e) => eprintln!("Concatenation failed: {}", e),
    }
}

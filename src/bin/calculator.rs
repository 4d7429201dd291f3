// Console entry point for the Calculator component.

use winapp::{calculator::Calculator, error::Result, logging, platform::Apartment};

fn run() -> Result<()> {
    let _apartment = Apartment::enter()?;

    let calculator = Calculator::new();
    let result = calculator.add(3, 5);
    println!("Result of 3 + 5 = {result}");
    Ok(())
}

fn main() {
    if let Err(e) = logging::init() {
        eprintln!("{e}");
    }
    if let Err(e) = run() {
        log::error!("calculator failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = fcl::run_from_env() {
        eprintln!("fcl: {error}");
        std::process::exit(error.exit_code());
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match recentpick_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[recentpick] {error}");
            eprint!("{}", recentpick_core::runtime::usage());
            std::process::exit(2);
        }
    };

    if let Err(error) = recentpick_core::runtime::run_with_options(options) {
        eprintln!("[recentpick] {error}");
        std::process::exit(1);
    }
}

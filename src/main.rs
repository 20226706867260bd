// src/main.rs

use execvisor::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(shell_exit_code(code)),
        Err(err) => {
            eprintln!("execvisor error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}

/// Signal-terminated children report `-signal`; shells expect `128 + signal`.
fn shell_exit_code(code: i32) -> i32 {
    if code < 0 { 128 - code } else { code }
}

use std::process;

#[cfg(windows)]
fn main() {
    use gpu_query::{report, Backend, WmiBackend};
    use std::io;
    use std::sync::Arc;

    pretty_env_logger::init();

    let backend: Arc<dyn Backend> = Arc::new(WmiBackend::new());
    let code = match report::run(backend, &mut io::stdout()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error writing report: {}", e);
            1
        }
    };
    process::exit(code);
}

#[cfg(not(windows))]
fn main() {
    pretty_env_logger::init();
    eprintln!("gpu-query reads the host management subsystem (WMI) and only runs on Windows");
    process::exit(1);
}

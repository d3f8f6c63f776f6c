use eventloop::application::config::loader::ConfigLoader;
use eventloop::application::console::Console;
use eventloop::common::logger::Logger;
use eventloop::core::event::EventLoop;
use eventloop::core::fd::Descriptor;
use std::env;
use std::time::Duration;

fn main() {
    let program = env::args().next().unwrap_or_else(|| "eventloop-demo".to_string());
    let config = match ConfigLoader::from_args(env::args()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: {} [config_file]", program);
            std::process::exit(1);
        }
    };

    if let Err(e) = Logger::init(&config.logging.filter) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let mut event_loop = EventLoop::from_config(&config.event_loop);
    let console = Console::new(&config.console);
    let stdin = Descriptor::stdin();
    console.attach(&mut event_loop, stdin.as_raw_fd());

    println!("+/- counter, W/w add/remove workproc, c drop stdin, t cancel timer,");
    println!(
        "1..{} start a preset timer. Ctrl-D quits.",
        config.console.timer_presets_ms.len()
    );

    // Zero means no time limit: run until stdin is gone
    let finished = console.finished();
    event_loop.defer_loop(Duration::ZERO, &finished);
}

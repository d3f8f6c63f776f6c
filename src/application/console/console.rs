use crate::application::config::models::ConsoleConfig;
use crate::application::console::command::Command;
use crate::core::event::{CallbackId, EventLoop, TimerId, WorkProcId};
use crate::core::fd::read_non_blocking;
use std::cell::{Cell, RefCell};
use std::os::unix::io::RawFd;
use std::rc::Rc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Default)]
struct ConsoleState {
    counter: i64,
    commands: u64,
    workproc_calls: u64,
    timeouts: Vec<usize>,
    callback: Option<CallbackId>,
    workproc: Option<WorkProcId>,
    timer: Option<TimerId>,
    heartbeat: Option<TimerId>,
}

/// Keyboard-driven exerciser for the event loop.
///
/// Reads one byte per callback from a descriptor (stdin in the binary) and
/// turns it into registrations and removals on the loop. Clones share state.
#[derive(Clone)]
pub struct Console {
    state: Rc<RefCell<ConsoleState>>,
    finished: Rc<Cell<bool>>,
    presets: Rc<[Duration]>,
    heartbeat: Option<Duration>,
}

impl Console {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(ConsoleState::default())),
            finished: Rc::new(Cell::new(false)),
            presets: config.timer_presets().into(),
            heartbeat: config.heartbeat(),
        }
    }

    /// Start watching `fd`, plus the heartbeat timer if configured.
    pub fn attach(&self, event_loop: &mut EventLoop, fd: RawFd) -> CallbackId {
        let console = self.clone();
        let id = event_loop.add_callback(fd, move |el, fd| console.on_readable(el, fd));
        self.state.borrow_mut().callback = Some(id);

        if let Some(period) = self.heartbeat {
            let state = Rc::clone(&self.state);
            let hb = event_loop.add_periodic_timer(period, move |_| {
                let state = state.borrow();
                info!(
                    "heartbeat: counter {} commands {}",
                    state.counter, state.commands
                );
            });
            self.state.borrow_mut().heartbeat = Some(hb);
        }
        id
    }

    /// Set once the input reached end of file or failed.
    pub fn finished(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.finished)
    }

    pub fn counter(&self) -> i64 {
        self.state.borrow().counter
    }

    pub fn commands(&self) -> u64 {
        self.state.borrow().commands
    }

    pub fn workproc_calls(&self) -> u64 {
        self.state.borrow().workproc_calls
    }

    /// Preset numbers of the timers that have fired, in firing order.
    pub fn timeouts(&self) -> Vec<usize> {
        self.state.borrow().timeouts.clone()
    }

    fn on_readable(&self, event_loop: &mut EventLoop, fd: RawFd) {
        let mut byte = [0u8; 1];
        match read_non_blocking(fd, &mut byte) {
            Ok(Some(1)) => {
                if let Some(command) = Command::parse(byte[0], self.presets.len()) {
                    self.apply(event_loop, command);
                }
            }
            Ok(None) => {}
            Ok(_) => {
                info!("Input on fd {} closed", fd);
                self.detach(event_loop);
            }
            Err(e) => {
                error!("read: {}", e);
                self.detach(event_loop);
            }
        }
    }

    pub fn apply(&self, event_loop: &mut EventLoop, command: Command) {
        match command {
            Command::Increment => self.state.borrow_mut().counter += 1,
            Command::Decrement => self.state.borrow_mut().counter -= 1,
            Command::AddWorkProc => {
                let state = Rc::clone(&self.state);
                let id = event_loop.add_workproc(move |el| {
                    let mut state = state.borrow_mut();
                    state.workproc_calls += 1;
                    info!(
                        "workproc @ {:?} {} {}",
                        el.now(),
                        state.counter,
                        state.workproc_calls
                    );
                });
                self.state.borrow_mut().workproc = Some(id);
            }
            Command::RemoveWorkProc => {
                if let Some(id) = self.state.borrow_mut().workproc.take() {
                    event_loop.remove_workproc(id);
                }
            }
            Command::RemoveCallback => {
                if let Some(id) = self.state.borrow_mut().callback.take() {
                    event_loop.remove_callback(id);
                }
            }
            Command::RemoveTimer => {
                if let Some(id) = self.state.borrow_mut().timer.take() {
                    event_loop.remove_timer(id);
                }
            }
            Command::AddTimer(n) => {
                let Some(delay) = n.checked_sub(1).and_then(|i| self.presets.get(i)).copied() else {
                    warn!("No timer preset {}", n);
                    return;
                };
                let state = Rc::clone(&self.state);
                let id = event_loop.add_timer(delay, move |_| {
                    info!("timeout {}", n);
                    state.borrow_mut().timeouts.push(n);
                });
                self.state.borrow_mut().timer = Some(id);
            }
        }

        let mut state = self.state.borrow_mut();
        state.commands += 1;
        info!("callback: {}", state.commands);
    }

    fn detach(&self, event_loop: &mut EventLoop) {
        let (callback, heartbeat) = {
            let mut state = self.state.borrow_mut();
            (state.callback.take(), state.heartbeat.take())
        };
        if let Some(id) = callback {
            event_loop.remove_callback(id);
        }
        if let Some(id) = heartbeat {
            event_loop.remove_timer(id);
        }
        self.finished.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fd::{pipe, write_non_blocking};

    fn console_with_presets(presets_ms: Vec<u64>) -> Console {
        Console::new(&ConsoleConfig {
            timer_presets_ms: presets_ms,
            heartbeat_ms: 0,
        })
    }

    #[test]
    fn test_counter_commands() {
        let (reader, writer) = pipe().unwrap();
        let mut event_loop = EventLoop::new();
        let console = console_with_presets(vec![1000]);
        console.attach(&mut event_loop, reader.as_raw_fd());

        write_non_blocking(writer.as_raw_fd(), b"++-\n").unwrap();
        for _ in 0..4 {
            event_loop.one_loop();
        }

        assert_eq!(console.counter(), 1);
        // newline is absorbed silently
        assert_eq!(console.commands(), 3);
    }

    #[test]
    fn test_workproc_add_and_remove() {
        let (reader, writer) = pipe().unwrap();
        let mut event_loop = EventLoop::new();
        let console = console_with_presets(vec![1000]);
        console.attach(&mut event_loop, reader.as_raw_fd());

        write_non_blocking(writer.as_raw_fd(), b"W").unwrap();
        event_loop.one_loop();
        assert_eq!(event_loop.workproc_count(), 1);

        // pipe drained, so these iterations are idle
        event_loop.one_loop();
        event_loop.one_loop();
        assert_eq!(console.workproc_calls(), 2);

        write_non_blocking(writer.as_raw_fd(), b"w").unwrap();
        event_loop.one_loop();
        assert_eq!(event_loop.workproc_count(), 0);
    }

    #[test]
    fn test_preset_timer_fires() {
        let (reader, writer) = pipe().unwrap();
        let mut event_loop = EventLoop::new();
        let console = console_with_presets(vec![5, 10_000]);
        console.attach(&mut event_loop, reader.as_raw_fd());

        write_non_blocking(writer.as_raw_fd(), b"1").unwrap();
        event_loop.one_loop();
        assert_eq!(event_loop.timer_count(), 1);

        event_loop.run_for(Duration::from_millis(50));
        assert_eq!(console.timeouts(), vec![1]);
    }

    #[test]
    fn test_remove_timer_command() {
        let (reader, writer) = pipe().unwrap();
        let mut event_loop = EventLoop::new();
        let console = console_with_presets(vec![10_000]);
        console.attach(&mut event_loop, reader.as_raw_fd());

        write_non_blocking(writer.as_raw_fd(), b"1t").unwrap();
        event_loop.one_loop();
        event_loop.one_loop();
        assert_eq!(event_loop.timer_count(), 0);
        assert_eq!(console.commands(), 2);
    }

    #[test]
    fn test_eof_detaches() {
        let (reader, writer) = pipe().unwrap();
        let mut event_loop = EventLoop::new();
        let console = Console::new(&ConsoleConfig {
            timer_presets_ms: vec![1000],
            heartbeat_ms: 60_000,
        });
        console.attach(&mut event_loop, reader.as_raw_fd());
        assert_eq!(event_loop.timer_count(), 1);

        drop(writer);
        event_loop.one_loop();

        assert!(console.finished().get());
        assert_eq!(event_loop.callback_count(), 0);
        assert_eq!(event_loop.timer_count(), 0);
    }

    #[test]
    fn test_remove_callback_command() {
        let (reader, writer) = pipe().unwrap();
        let mut event_loop = EventLoop::new();
        let console = console_with_presets(vec![1000]);
        console.attach(&mut event_loop, reader.as_raw_fd());

        write_non_blocking(writer.as_raw_fd(), b"c").unwrap();
        event_loop.one_loop();
        assert_eq!(event_loop.callback_count(), 0);
        assert!(!console.finished().get());
    }
}

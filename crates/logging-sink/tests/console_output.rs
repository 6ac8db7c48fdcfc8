//! Integration tests for writer-backed sinks behind a messenger.

use std::fs::File;
use std::io::Read;
use std::sync::Arc;
use std::thread;

use logging::{Messenger, MessagingConfig, MessagingContext};
use logging_sink::SharedSink;

#[test]
fn messenger_renders_console_lines() {
    let sink = Arc::new(SharedSink::new(Vec::new()));
    let config = MessagingConfig::from_options::<&str>(false, 1, &[]);
    let messenger = Messenger::new(Arc::new(MessagingContext::new(config)), sink.clone());

    messenger.debug(1, ["resolving providers"]);
    messenger.note(["Executing tasks"]);
    messenger.warnonce(["Host distribution has not been validated"]);
    messenger.warnonce(["Host distribution has not been validated"]);
    messenger.plain(["Summary: 1 task failed"]);
    let _ = messenger.fatal::<(), _>(["Execution failed"]);

    let output = String::from_utf8(sink.take_writer()).unwrap();
    assert_eq!(
        output,
        "DEBUG: resolving providers\n\
         NOTE: Executing tasks\n\
         WARNING: Host distribution has not been validated\n\
         Summary: 1 task failed\n\
         ERROR: Execution failed\n"
    );
}

#[test]
fn concurrent_writers_do_not_interleave_lines() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    let file = tempfile::NamedTempFile::new().unwrap();
    let sink = Arc::new(SharedSink::new(file.reopen().unwrap()));
    let messenger = Messenger::new(Arc::new(MessagingContext::default()), sink);

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let messenger = messenger.for_logger(format!("BitBake.Worker{id}"));
            thread::spawn(move || {
                for n in 0..PER_THREAD {
                    messenger.note([format!("thread {id} line {n}")]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut contents = String::new();
    File::open(file.path())
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    assert!(lines.iter().all(|line| line.starts_with("NOTE: thread ")));

    for id in 0..THREADS {
        let prefix = format!("NOTE: thread {id} line ");
        let order: Vec<usize> = lines
            .iter()
            .filter_map(|line| line.strip_prefix(prefix.as_str()))
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(order, (0..PER_THREAD).collect::<Vec<_>>());
    }
}

use std::env;
use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};

/// Stand-in for gdb: records its argv and every line arriving on stdin, then
/// exits on EOF. The files to record into come from the environment, so the
/// driver under test needs no special flags.
fn main() {
    if let Ok(path) = env::var("FAKE_GDB_ARGV_FILE") {
        let argv: Vec<String> = env::args().skip(1).collect();
        std::fs::write(&path, argv.join("\n")).expect("writing argv record should succeed");
    }

    let mut commands = env::var("FAKE_GDB_COMMANDS_FILE").ok().map(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("opening commands record should succeed")
    });

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        if let Some(file) = commands.as_mut() {
            writeln!(file, "{line}").expect("recording command should succeed");
        }
    }
}

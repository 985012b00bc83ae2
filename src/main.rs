mod builtin;
mod engine;
mod launch;
mod search;
mod session;
mod tokens;
mod transport;

use std::io::{self, BufRead, Write};

fn main() {
    let mut session = session::Session::init();

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut stdout = io::stdout();

    loop {
        if session.interactive {
            let _ = write!(stdout, "{}: ", session.lines_accepted);
            let _ = stdout.flush();
        }

        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        session.lines_accepted += 1;

        let tokens = tokens::tokenize(&line);
        if tokens.is_empty() {
            continue;
        }

        if let Some(cmd) = tokens.get(0).and_then(builtin::lookup) {
            (cmd.run)(&mut session, &tokens);
        } else if let Err(e) = engine::run(&tokens) {
            // Local to this line; the loop always reads the next one.
            println!("tsh: {}", e);
        }
    }
}

//! Built-in commands. These run inside the shell process itself — `cd` and
//! `exit` would act on the wrong process if forked — so dispatch happens
//! before the engine ever sees the line.

use std::env;
use std::process;

use crate::session::Session;
use crate::tokens::Tokens;

type BuiltinFn = fn(&mut Session, &Tokens) -> u8;

pub struct Builtin {
    pub name: &'static str,
    pub doc: &'static str,
    pub run: BuiltinFn,
}

const TABLE: &[Builtin] = &[
    Builtin { name: "help", doc: "show this help menu", run: builtin_help },
    Builtin { name: "exit", doc: "exit the command shell", run: builtin_exit },
    Builtin { name: "cd", doc: "change the current working directory", run: builtin_cd },
    Builtin { name: "pwd", doc: "print the current working directory", run: builtin_pwd },
];

/// Exact-name lookup; `None` means fall through to external execution.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    TABLE.iter().find(|b| b.name == name)
}

fn builtin_help(_: &mut Session, _: &Tokens) -> u8 {
    for builtin in TABLE {
        println!("{} - {}", builtin.name, builtin.doc);
    }
    0
}

fn builtin_exit(_: &mut Session, _: &Tokens) -> u8 {
    process::exit(0)
}

fn builtin_cd(_: &mut Session, tokens: &Tokens) -> u8 {
    let path = match tokens.get(1) {
        Some(path) => path,
        None => {
            println!("cd: missing operand");
            return 1;
        }
    };
    match env::set_current_dir(path) {
        Ok(()) => 0,
        Err(e) => {
            println!("cd: {}: {}", path, e);
            1
        }
    }
}

fn builtin_pwd(_: &mut Session, _: &Tokens) -> u8 {
    match env::current_dir() {
        Ok(cwd) => {
            println!("{}", cwd.display());
            0
        }
        Err(e) => {
            println!("pwd: {}", e);
            1
        }
    }
}

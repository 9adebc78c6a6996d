//! Minimal indentation-aware logging used by the synthesizer and solution
//! space to trace rule generation and enumeration without pulling in a full
//! logging framework.

use std::cell::Cell;
use std::cell::RefCell;

thread_local! {
    pub static LOGLEVEL: Cell<u8> = const { Cell::new(2) };
}
thread_local! {
    pub static INDENT: RefCell<String> = RefCell::new(String::new());
}

/// Sets the log level: 0 = silent, 1 = critical, 2 = warn, 3 = info, 4-5 = debug.
pub fn set_log_level(level: u8) {
    LOGLEVEL.set(level);
}

pub fn log_level() -> u8 {
    LOGLEVEL.get()
}

pub fn indent() {
    INDENT.with_borrow_mut(|s| s.push_str("  "));
}

pub fn dedent() {
    INDENT.with_borrow_mut(|s| {
        s.pop();
        s.pop()
    });
}

#[macro_export]
macro_rules! info {
    ($($fmt:expr),+) => {
        if $crate::log::LOGLEVEL.get() >= 3 {
            $crate::log::INDENT.with_borrow(|s| {
                eprintln!("{}\u{001b}[34;1mINFO\u{001b}[0m \u{001b}[36m{:?}\u{001b}[0m {}:{}", s, format_args!($($fmt),+), file!(), line!())
            })
        }
    };
}

#[macro_export]
macro_rules! debg {
    ($($fmt:expr),+) => {
        if $crate::log::LOGLEVEL.get() >= 4 {
            $crate::log::INDENT.with_borrow(|s| {
                eprintln!("{}\u{001b}[32mDEBG\u{001b}[0m \u{001b}[36m{:?}\u{001b}[0m {}:{}", s, format_args!($($fmt),+), file!(), line!())
            })
        }
    };
}

#[macro_export]
macro_rules! debg2 {
    ($($fmt:expr),+) => {
        if $crate::log::LOGLEVEL.get() >= 5 {
            $crate::log::INDENT.with_borrow(|s| {
                eprintln!("{}\u{001b}[32mDEBG\u{001b}[0m \u{001b}[36m{:?}\u{001b}[0m {}:{}", s, format_args!($($fmt),+), file!(), line!())
            })
        }
    };
}

#[macro_export]
macro_rules! warn {
    ($($fmt:expr),+) => {
        if $crate::log::LOGLEVEL.get() >= 2 {
            $crate::log::INDENT.with_borrow(|s| {
                eprintln!("{}\u{001b}[33;1mWARN\u{001b}[0m \u{001b}[36m{:?}\u{001b}[0m {}:{}", s, format_args!($($fmt),+), file!(), line!())
            })
        }
    };
}

/// Logs `$fmt` at info level, then runs `$e` with the indentation bumped by
/// one level — handy for bracketing a recursive call in trace output.
#[macro_export]
macro_rules! infob {
    ($fmt:literal, $e:expr) => {
        if $crate::log::LOGLEVEL.get() >= 3 {
            $crate::log::INDENT.with_borrow(|s| {
                eprintln!("{}\u{001b}[36;1mINFO\u{001b}[0m \u{001b}[36m{:?}\u{001b}[0m {}:{}", s, format_args!($fmt), file!(), line!())
            });
            $crate::log::indent();
            let _result_ = $e;
            $crate::log::dedent();
            _result_
        } else {
            $e
        }
    };
}

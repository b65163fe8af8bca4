#!/usr/bin/env rust-script
//! ```cargo
//! [dependencies]
//! yansi = "0.5"
//! ```
extern crate yansi;
use std::process::Command;

macro_rules! run_command {
    ($cmd:expr , $($arg:expr),*) => (
        let mut command = command!($cmd, $($arg),*);
        let mut child = command.spawn().unwrap();
        let status = child.wait().unwrap();
        if !status.success() {
            print!("> {}",yansi::Paint::red("qualify terminates due to error"));
            std::process::exit(-1);
        }
    )
}

macro_rules! command {
    ($cmd:expr , $($arg:expr),*) => (
        {
            print!("\n> {}",yansi::Paint::yellow($cmd));
            let mut command = Command::new($cmd);
            $(
                print!(" {}",yansi::Paint::yellow(&$arg));
                command.arg($arg);
            )*
            print!("\n");
            command
        }
    )
}

#[rustfmt::skip]
fn main() {
    println!("Qualify sqlhelper");

    // Format
    run_command!("cargo", "fmt");

    // Build in important variants
    run_command!("cargo", "build", "--package", "sqlhelper");
    run_command!("cargo", "build", "--package", "sqlhelper", "--no-default-features", "--features", "mssql");
    run_command!("cargo", "build", "--package", "sqlhelper", "--all-features");
    run_command!("cargo", "build", "--package", "sqlhelper", "--all-features", "--release");

    // Clippy in important variants
    run_command!("cargo", "+nightly", "clippy", "--all-targets", "--package", "sqlhelper", "--", "-D", "warnings");
    run_command!("cargo", "+nightly", "clippy", "--all-targets", "--package", "sqlhelper", "--all-features", "--", "-D", "warnings");
    // the tests need sqlite, so only the library is checked without it
    run_command!("cargo", "+nightly", "clippy", "--lib", "--package", "sqlhelper", "--no-default-features", "--features", "mssql", "--", "-D", "warnings");

    // doc
    run_command!("cargo", "+nightly", "doc", "--package", "sqlhelper", "--all-features", "--no-deps", "--open");
    // doc-tests
    run_command!("cargo", "+nightly", "test", "--doc", "--package", "sqlhelper");

    // Run tests in important variants
    run_command!("cargo", "test", "--package", "sqlhelper", "--release", "--all-features");
    run_command!("cargo", "test", "--package", "sqlhelper");
    run_command!("cargo", "test", "--package", "sqlhelper", "--features", "mssql");

    // check git status
    let mut cmd = command!("git", "status", "-s");
    let child = cmd.stdout(std::process::Stdio::piped()).spawn().unwrap();
    let output = child.wait_with_output().unwrap();
    if output.stdout.len() > 0 {
        print!("> {}", yansi::Paint::red("there are unsubmitted files"));
        std::process::exit(-1);
    }

    // say goodbye
    println!("\n> all done :-)  Looks like you're ready to \"cargo publish\"?");
}

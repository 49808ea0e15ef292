//! Produces the bcrypt hash the admin login checks against.
//!
//! Usage:
//!   hash-password <PASSWORD> [COST]
//!   hash-password --verify <PASSWORD> <HASH>

use bcrypt::{hash, verify, DEFAULT_COST};
use std::env;
use std::process::exit;

fn usage() -> ! {
    eprintln!("Usage: hash-password <PASSWORD> [COST]");
    eprintln!("       hash-password --verify <PASSWORD> <HASH>");
    exit(1);
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    match args.as_slice() {
        [flag, password, hashed] if flag == "--verify" => match verify(password, hashed) {
            Ok(true) => println!("Password matches"),
            Ok(false) => {
                println!("Password does NOT match");
                exit(2);
            }
            Err(e) => {
                eprintln!("Invalid hash: {}", e);
                exit(1);
            }
        },
        [password] | [password, _] => {
            let cost = match args.get(1) {
                Some(raw) => raw.parse::<u32>().unwrap_or_else(|_| usage()),
                None => DEFAULT_COST,
            };
            match hash(password, cost) {
                Ok(hashed) => {
                    println!("\nCost : {}", cost);
                    println!("Hash : {}\n", hashed);
                    println!("# Add to .env next to ADMIN_USERNAME:");
                    println!("ADMIN_HASH_PASSWORD={}", hashed);
                }
                Err(e) => {
                    eprintln!("Error hashing password: {}", e);
                    exit(1);
                }
            }
        }
        _ => usage(),
    }
}

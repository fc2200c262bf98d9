//! HASH-PASSWORD command - Produce an Argon2 PHC string for seeding identities.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use clap::Args;

/// Arguments for the hash-password command.
#[derive(Args)]
pub struct HashPasswordArgs {
    /// Password to hash
    #[arg(env = "SIGELA_PASSWORD", hide_env_values = true)]
    pub password: String,
}

fn hash(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow!("failed to hash password: {}", e))
}

/// Execute the hash-password command. Prints only the hash so it can be
/// piped into SQL.
pub fn execute(args: HashPasswordArgs) -> Result<()> {
    println!("{}", hash(&args.password)?);
    Ok(())
}

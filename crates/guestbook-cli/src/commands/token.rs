// crates/guestbook-cli/src/commands/token.rs
//
// `guestbook token-digest <token>`: print the digest to put in the daemon's
// `auth_tokens` config.

use guestbook_core::token_digest;

pub fn run(token: &str, subject: Option<&str>) {
    let digest = token_digest(token);
    match subject {
        Some(subject) => {
            println!("[[auth_tokens]]");
            println!("subject = \"{}\"", subject);
            println!("token_sha256 = \"{}\"", digest);
        }
        None => println!("{}", digest),
    }
}

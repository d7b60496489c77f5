//! Git authentication callbacks
//!
//! Authentication is delegated to git's native credential system:
//! - SSH agent, then SSH keys from ~/.ssh/
//! - Git credential helpers from the default git config
//! - Anonymous access for public repositories

use git2::{Cred, CredentialType, Error, ErrorClass, ErrorCode, RemoteCallbacks};
use tracing::trace;

const SSH_KEY_NAMES: [&str; 3] = ["id_ed25519", "id_rsa", "id_ecdsa"];

fn auth_error(message: &str) -> Error {
    Error::new(ErrorCode::Auth, ErrorClass::Http, message)
}

fn anonymous() -> std::result::Result<Cred, Error> {
    ["git", "anonymous"]
        .iter()
        .find_map(|username| Cred::userpass_plaintext(username, "").ok())
        .ok_or_else(|| auth_error("authentication failed"))
}

fn ssh_key_from_disk(username: &str) -> std::result::Result<Cred, Error> {
    let ssh_dir = dirs::home_dir().unwrap_or_default().join(".ssh");

    for key_name in SSH_KEY_NAMES {
        let private_key = ssh_dir.join(key_name);
        if !private_key.exists() {
            continue;
        }
        let public_key = ssh_dir.join(format!("{key_name}.pub"));
        let public_key = public_key.exists().then_some(public_key.as_path());

        if let Ok(cred) = Cred::ssh_key(username, public_key, &private_key, None) {
            trace!(key = key_name, "Using SSH key");
            return Ok(cred);
        }
    }

    Err(auth_error("SSH key not found"))
}

fn user_pass(url: &str, username_from_url: Option<&str>) -> std::result::Result<Cred, Error> {
    let config = git2::Config::open_default().or_else(|_| git2::Config::new())?;

    if let Ok(cred) = Cred::credential_helper(&config, url, username_from_url) {
        return Ok(cred);
    }
    if let Some(username) = username_from_url {
        if let Ok(cred) = Cred::userpass_plaintext(username, "") {
            return Ok(cred);
        }
    }
    anonymous()
}

/// Remote callbacks with credential lookup installed
pub fn remote_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|url, username_from_url, allowed_types| {
        if allowed_types.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }

        if allowed_types.contains(CredentialType::SSH_KEY) {
            return match username_from_url {
                Some(username) => {
                    Cred::ssh_key_from_agent(username).or_else(|_| ssh_key_from_disk(username))
                }
                None => anonymous(),
            };
        }

        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return user_pass(url, username_from_url);
        }

        Err(auth_error("authentication failed"))
    });
    callbacks
}

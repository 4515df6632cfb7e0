//! SSH transport implementation using russh.
//!
//! Opens one session per executed command (login, exec, disconnect),
//! which is what makes session-negotiation failures recoverable by
//! simply retrying the command.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use russh::ChannelMsg;
use russh::client::{self, Handle};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use secrecy::ExposeSecret;

use super::CommandRunner;
use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::error::{Result, TransportError};

/// SSH command runner wrapping a russh client.
pub struct SshRunner {
    config: SshConfig,
}

impl SshRunner {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CommandRunner for SshRunner {
    async fn run(&mut self, command: &str) -> Result<String> {
        let session = connect(&self.config).await?;
        let output = exec(&session, command).await;
        let _ = session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await;
        output
    }
}

/// Connect and authenticate one session.
async fn connect(config: &SshConfig) -> Result<Handle<SshHandler>> {
    let ssh_config = Arc::new(client::Config {
        inactivity_timeout: Some(config.timeout),
        ..Default::default()
    });

    let handler = SshHandler {
        host: config.host.clone(),
        port: config.port,
        host_key_verification: config.host_key_verification.clone(),
        known_hosts_path: config.known_hosts_path.clone(),
    };

    // Negotiation failures here are the transient class: the NX-OS
    // SSH implementation intermittently rejects the handshake, and a
    // fresh attempt succeeds.
    let mut session = tokio::time::timeout(
        config.timeout,
        client::connect(ssh_config, (config.host.as_str(), config.port), handler),
    )
    .await
    .map_err(|_| TransportError::Timeout(config.timeout))?
    .map_err(|e| TransportError::Session {
        host: config.host.clone(),
        message: e.to_string(),
    })?;

    authenticate(&mut session, config).await?;

    Ok(session)
}

/// Authenticate with the server.
async fn authenticate(session: &mut Handle<SshHandler>, config: &SshConfig) -> Result<()> {
    let success = match &config.auth {
        AuthMethod::None => session
            .authenticate_none(&config.username)
            .await
            .map_err(TransportError::Ssh)?
            .success(),
        AuthMethod::Password(password) => session
            .authenticate_password(&config.username, password.expose_secret())
            .await
            .map_err(TransportError::Ssh)?
            .success(),
        AuthMethod::PrivateKey { path, passphrase } => {
            let key = load_secret_key(path, passphrase.as_deref())
                .map_err(|e| TransportError::Key(e.to_string()))?;

            let hash_alg = session
                .best_supported_rsa_hash()
                .await
                .map_err(TransportError::Ssh)?
                .flatten();

            session
                .authenticate_publickey(
                    &config.username,
                    PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                )
                .await
                .map_err(TransportError::Ssh)?
                .success()
        }
    };

    if !success {
        // A clean rejection of valid auth data. Not retried.
        return Err(TransportError::AuthenticationFailed {
            user: config.username.clone(),
            host: config.host.clone(),
        }
        .into());
    }

    Ok(())
}

/// Run one command on an exec channel and collect stdout.
async fn exec(session: &Handle<SshHandler>, command: &str) -> Result<String> {
    let mut channel = session
        .channel_open_session()
        .await
        .map_err(TransportError::Ssh)?;

    channel.exec(true, command).await.map_err(TransportError::Ssh)?;

    let mut output = Vec::new();
    loop {
        let Some(msg) = channel.wait().await else {
            break;
        };
        match msg {
            ChannelMsg::Data { ref data } => output.extend_from_slice(data),
            ChannelMsg::ExitStatus { exit_status } => {
                debug!("'{command}' exited with status {exit_status}");
            }
            ChannelMsg::Eof | ChannelMsg::Close => break,
            _ => {}
        }
    }

    Ok(String::from_utf8_lossy(&output).into_owned())
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
}

impl SshHandler {
    /// Check the host key against known_hosts. `Ok(true)` if matched,
    /// `Ok(false)` if the host is not recorded.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> std::result::Result<bool, russh::Error> {
        let result = if let Some(ref path) = self.known_hosts_path {
            russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::check_known_hosts(&self.host, self.port, pubkey)
        };
        result.map_err(|_| russh::Error::UnknownKey)
    }

    /// Save a new host key to known_hosts.
    fn learn_host_key(&self, pubkey: &PublicKey) {
        let result = if let Some(ref path) = self.known_hosts_path {
            russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey)
        };
        if let Err(e) = result {
            warn!("Failed to save host key for {}: {}", self.host, e);
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.host_key_verification {
            HostKeyVerification::Disabled => Ok(true),

            HostKeyVerification::AcceptNew => match self.check_known_hosts(server_public_key) {
                Ok(true) => Ok(true),
                Ok(false) => {
                    self.learn_host_key(server_public_key);
                    Ok(true)
                }
                Err(_) => Ok(false),
            },

            HostKeyVerification::Strict => {
                Ok(self.check_known_hosts(server_public_key).unwrap_or(false))
            }
        }
    }
}

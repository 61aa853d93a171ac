use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use drive_core::hex_dump;
use drive_sce::sg::DEFAULT_DEVICE;
use drive_sce::{
    AuthSession, DiscAddress, Engine, KeyStore, RetryPolicy, RoleMode, SgTransport, ps2_auth_data,
    ps3_auth_data,
};

use super::stage::Stage;

type DriveEngine<'k> = Engine<'k, SgTransport>;

/**
    Authenticate with a drive, then run the steps of the selected role mode.
*/
#[derive(Args)]
pub struct AuthCommand {
    /// Device node of the drive.
    #[arg(short, long, default_value = DEFAULT_DEVICE)]
    device: PathBuf,

    /// JSON key file.
    #[arg(short, long)]
    keys: PathBuf,

    /// Role mode, by name (ps3-disc, drive-auth, ...) or number.
    #[arg(short, long, default_value = "ps3-disc")]
    mode: RoleMode,

    /// Do not retry the first super key pair.
    #[arg(long)]
    no_retry: bool,

    /// Per-command timeout in milliseconds.
    #[arg(long, default_value_t = 20_000)]
    timeout_ms: u64,

    /// PS2 watermark layer.
    #[arg(long, default_value_t = 0)]
    layer: u8,

    /// PS2 watermark area.
    #[arg(long, default_value_t = 0)]
    area: u8,

    /// PS2 watermark logical block address.
    #[arg(long, default_value_t = 1)]
    lba: u32,
}

impl AuthCommand {
    pub fn run(self) -> Result<()> {
        let keys = KeyStore::from_file(&self.keys)
            .with_context(|| format!("failed to load key file {}", self.keys.display()))?;
        let transport = SgTransport::new(self.device.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms));
        let mut engine = Engine::new(&keys, transport);

        let retry_policy = if self.no_retry {
            RetryPolicy::NoRetry
        } else {
            RetryPolicy::AllowRetry
        };
        let mut session = AuthSession::new(self.mode).with_retry_policy(retry_policy);

        let tier = Stage::SuperAuth.check(self.mode, engine.authenticate_as_super(&mut session))?;
        eprintln!(
            "Authenticated {} as super ({tier} key pair)",
            self.device.display()
        );

        match self.mode {
            RoleMode::DRIVE_AUTH => {
                session.role_mode = RoleMode(4);
                user_auth(&mut engine, &mut session)
            }
            mode if mode.value() <= 4 => user_auth(&mut engine, &mut session),
            RoleMode::PS3_DISC => ps3_disc(&mut engine, &session),
            RoleMode::PS2_DISC => {
                let address = DiscAddress {
                    layer: self.layer,
                    area: self.area,
                    lba: self.lba,
                };
                ps2_disc(&mut engine, &session, address)
            }
            RoleMode::GET_VERSION => get_version(&mut engine, &session),
            _ => Ok(()),
        }
    }
}

fn dump(label: &str, data: &[u8]) {
    println!("{label}:");
    println!("{}", hex_dump(data));
}

fn set_user_parameter(engine: &mut DriveEngine<'_>, session: &AuthSession) -> Result<()> {
    Stage::SetUserParameter.check(session.role_mode, engine.set_user_parameter(session))
}

fn user_auth(engine: &mut DriveEngine<'_>, session: &mut AuthSession) -> Result<()> {
    set_user_parameter(engine, session)?;
    Stage::UserAuth.check(session.role_mode, engine.authenticate_as_user(session))?;

    let keys = Stage::UserAuth.check(session.role_mode, session.session_keys())?;
    dump("Session Key 1", &keys.key1);
    dump("Session Key 2", &keys.key2);
    Ok(())
}

fn ps3_disc(engine: &mut DriveEngine<'_>, session: &AuthSession) -> Result<()> {
    let mode = session.role_mode;
    set_user_parameter(engine, session)?;

    let wm = Stage::GetWm3.check(mode, engine.get_wm3(session))?;
    dump("Contents Key", &wm.contents_key);
    dump("Misc WM", &wm.misc_wm);

    let disc_id = Stage::GetDiscId.check(mode, engine.get_disc_id(&wm.misc_wm))?;
    dump("Disc ID", &disc_id);
    println!("Disc Mode: {} ({})", wm.disc_mode.to_u64(), wm.disc_mode);

    let keys = Stage::GetWm3.check(mode, session.session_keys())?;
    dump("Session Key 1", &keys.key1);
    dump("Auth Data", &ps3_auth_data(&disc_id, wm.disc_mode, keys));
    Ok(())
}

fn ps2_disc(
    engine: &mut DriveEngine<'_>,
    session: &AuthSession,
    address: DiscAddress,
) -> Result<()> {
    set_user_parameter(engine, session)?;

    let wm = Stage::GetWm2.check(session.role_mode, engine.get_wm2(session, address))?;
    dump("Auth Data", &ps2_auth_data(&wm));
    Ok(())
}

fn get_version(engine: &mut DriveEngine<'_>, session: &AuthSession) -> Result<()> {
    set_user_parameter(engine, session)?;

    let version = Stage::GetVersion.check(session.role_mode, engine.get_version(session))?;
    dump("Version", &version);
    Ok(())
}

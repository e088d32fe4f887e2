use std::rc::Rc;

use anyhow::Result;
use room_mute::{
    config::Config,
    proto::{Command, Event},
    sys::LocalTracks,
    Room, TrackLayer,
};
use tokio::task;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);
    tracing::info!(?config, "starting demo");

    task::LocalSet::new()
        .run_until(async move {
            let tracks = Rc::new(LocalTracks::from_config(&config));
            let track = Rc::clone(&tracks) as Rc<dyn TrackLayer>;
            let room = Room::new(track);

            let buttons = [
                Command::MuteRoom {
                    audio: true,
                    video: false,
                },
                Command::MuteRoom {
                    audio: false,
                    video: true,
                },
                Command::MuteRoom {
                    audio: true,
                    video: true,
                },
                Command::UnmuteRoom {
                    audio: true,
                    video: false,
                },
                Command::UnmuteRoom {
                    audio: false,
                    video: true,
                },
                Command::UnmuteRoom {
                    audio: true,
                    video: true,
                },
            ];
            for command in buttons {
                let json = serde_json::to_string(&command)?;
                tracing::info!(command = %json, "button pressed");
                match room.execute(command).await {
                    Ok(()) => tracing::info!("done"),
                    Err(err) => tracing::warn!(error = %err, "failed"),
                }
            }

            let event: Event = serde_json::from_str(
                r#"{"event":"RoomMuted","data":{"audio":true,"video":true}}"#,
            )?;
            let muted = room.handle_event(event);
            tracks.end_session();
            if let Err(err) = muted.await {
                tracing::warn!(error = %err, "server mute interrupted");
            }

            Ok::<_, anyhow::Error>(())
        })
        .await
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(&config.log_filter)
        });
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
}

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use super::command::Command;
use super::controller::Session;
use super::event::BrokerEvent;
use super::render::Renderer;
use super::transport::BrokerTransport;

/// Drives `session` from user commands and broker events until the user quits
/// or the command channel closes, then hands the session back.
///
/// Broker events take priority over commands, so an acknowledgment that is
/// already queued is applied before the next user action is looked at.
pub async fn run<T, R>(
    mut session: Session<T, R>,
    mut commands: UnboundedReceiver<Command>,
    mut events: UnboundedReceiver<BrokerEvent>,
) -> Session<T, R>
where
    T: BrokerTransport,
    R: Renderer,
{
    loop {
        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                debug!("Broker event: {:?}", event);
                session.handle_event(event);
            }
            command = commands.recv() => match command {
                Some(Command::Quit) | None => break,
                Some(command) => {
                    if let Err(err) = session.execute(command) {
                        debug!("Command refused: {}", err);
                    }
                }
            },
        }
    }

    info!("Session loop finished");
    session
}

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const STOP_COMMAND: &str = "stop";

/// Give up on the console after this many read errors in a row.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 5;

/// Spawn a task reading console lines from `input`.
///
/// The `stop` command cancels `stop`; reading continues afterwards. The task ends
/// when `shutdown` is cancelled, the input is closed, or reading keeps failing.
pub fn spawn_stop_listener<R>(
    input: R,
    stop: CancellationToken,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(listen(input, stop, shutdown))
}

async fn listen<R>(mut input: R, stop: CancellationToken, shutdown: CancellationToken)
where
    R: AsyncBufRead + Unpin,
{
    // raw bytes: text in another encoding is just input that isn't a command
    let mut line = Vec::new();
    let mut consecutive_errors = 0;

    loop {
        let read = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            read = input.read_until(b'\n', &mut line) => read,
        };

        match read {
            Ok(0) => {
                debug!("Console input closed");
                break;
            }
            Ok(_) => {
                consecutive_errors = 0;
                let is_stop = is_stop_command(&String::from_utf8_lossy(&line));
                line.clear();
                if !is_stop {
                    continue;
                }
                if !stop.is_cancelled() {
                    info!("Stopping the download process after the current item.");
                }
                stop.cancel();
            }
            Err(e) => {
                line.clear();
                consecutive_errors += 1;
                warn!("Unable to read console input. Error: {}", e);
                if consecutive_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                    warn!("Giving up on console input; the stop command is no longer available.");
                    break;
                }
            }
        }
    }
}

fn is_stop_command(line: &str) -> bool {
    line.trim().to_lowercase() == STOP_COMMAND
}

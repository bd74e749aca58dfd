//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::PathBuf;
use std::time::Duration;

use bgp_nht_utils::task::{IntervalTask, Task};
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;
use tracing::{Instrument, debug_span};

use crate::southbound;

//
// Nexthop tracking tasks diagram:
//
//                            +--------------+
//       scan_interval (1x) -> |              |
//     import_interval (1x) -> |   ScanCore   |
//           connect (0/1x) -> |              |
//                            +--------------+
//

// Nexthop tracking inter-task message types.
pub mod messages {
    use serde::{Deserialize, Serialize};
    use tokio::net::UnixStream;

    // Type aliases.
    pub type ProtocolInputMsg = input::ProtocolMsg;

    // Input messages (child task -> main task).
    pub mod input {
        use super::*;

        #[derive(Debug, Deserialize, Serialize)]
        pub enum ProtocolMsg {
            ScanTimer(()),
            ImportTimer(()),
            Connect(ConnectMsg),
        }

        #[derive(Debug, Default, Deserialize, Serialize)]
        pub struct ConnectMsg {
            #[serde(skip)]
            pub stream: Option<UnixStream>,
        }

        impl ConnectMsg {
            pub(crate) fn stream(&mut self) -> Option<UnixStream> {
                self.stream.take()
            }
        }
    }
}

// ===== Nexthop tracking tasks =====

// Periodic scan timer task.
pub(crate) fn scan_interval(
    seconds: u16,
    scan_timerp: &Sender<()>,
) -> IntervalTask {
    let scan_timerp = scan_timerp.clone();

    IntervalTask::new(
        Duration::from_secs(seconds.into()),
        false,
        move || {
            let scan_timerp = scan_timerp.clone();

            async move {
                let _ = scan_timerp.send(()).await;
            }
        },
    )
}

// Periodic import timer task. The first revalidation runs as soon as the
// task starts.
pub(crate) fn import_interval(
    seconds: u16,
    import_timerp: &Sender<()>,
) -> IntervalTask {
    let import_timerp = import_timerp.clone();

    IntervalTask::new(
        Duration::from_secs(seconds.into()),
        true,
        move || {
            let import_timerp = import_timerp.clone();

            async move {
                let _ = import_timerp.send(()).await;
            }
        },
    )
}

// Routing service connect task.
pub(crate) fn connect(
    path: PathBuf,
    connectp: &Sender<messages::input::ConnectMsg>,
) -> Task<()> {
    let span = debug_span!("resolver");
    let _span_guard = span.enter();

    let connectp = connectp.clone();
    Task::spawn(
        async move {
            loop {
                match southbound::connect(&path).await {
                    Ok(stream) => {
                        // Send message to the parent task.
                        let msg = messages::input::ConnectMsg {
                            stream: Some(stream),
                        };
                        let _ = connectp.send(msg).await;
                        return;
                    }
                    Err(error) => {
                        error.log();
                        // Wait one second before trying again.
                        sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }
        .in_current_span(),
    )
}

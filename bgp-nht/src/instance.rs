//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use std::fmt::Write;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use bgp_nht_utils::task::{IntervalTask, Task};
use ipnetwork::IpNetwork;
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{Receiver, Sender};

use crate::af::AddressFamily;
use crate::cache::{NexthopCache, NexthopCaches};
use crate::connected::{ConnectedTable, Interface};
use crate::packet::message::Nexthop;
use crate::rib::{Bgp, NexthopAttr, RouteEngine};
use crate::southbound::{LookupClient, ZSERV_PATH};
use crate::tasks::messages::ProtocolInputMsg;
use crate::tasks::messages::input::ConnectMsg;
use crate::{import, scan, tasks};

// Default values.
pub const DFLT_SCAN_INTERVAL: u16 = 60;
pub const MIN_SCAN_INTERVAL: u16 = 5;
pub const MAX_SCAN_INTERVAL: u16 = 60;
pub const DFLT_IMPORT_INTERVAL: u16 = 15;

// Nexthop tracking configuration.
#[derive(Clone, Debug)]
pub struct ScanCfg {
    // Scan interval, in seconds.
    pub scan_interval: u16,
    // Import revalidation interval, in seconds.
    pub import_interval: u16,
    // Path to the routing service's Unix socket.
    pub zserv_path: PathBuf,
}

// Nexthop tracking core.
//
// Owns the per-address-family caches and connected tables, the resolver
// client and the periodic tasks. All state is mutated from the owning
// event loop through `process_protocol_msg` and the operator entry points.
#[derive(Debug)]
pub struct ScanCore {
    // Configuration data.
    pub config: ScanCfg,
    // Per-address-family nexthop caches.
    pub(crate) caches: NexthopCaches,
    // Connected prefix tables.
    pub(crate) connected: ConnectedTable,
    // Resolver client.
    pub(crate) client: LookupClient,
    // Periodic and connect tasks.
    tasks: CoreTasks,
}

#[derive(Debug, Default)]
struct CoreTasks {
    scan: Option<IntervalTask>,
    import: Option<IntervalTask>,
    connect: Option<Task<()>>,
}

#[derive(Clone, Debug)]
pub struct ProtocolInputChannelsTx {
    // Scan timer event.
    pub scan_timer: Sender<()>,
    // Import timer event.
    pub import_timer: Sender<()>,
    // Routing service connection event.
    pub connect: Sender<ConnectMsg>,
}

#[derive(Debug)]
pub struct ProtocolInputChannelsRx {
    // Scan timer event.
    pub scan_timer: Receiver<()>,
    // Import timer event.
    pub import_timer: Receiver<()>,
    // Routing service connection event.
    pub connect: Receiver<ConnectMsg>,
}

// ===== impl ScanCfg =====

impl Default for ScanCfg {
    fn default() -> ScanCfg {
        ScanCfg {
            scan_interval: DFLT_SCAN_INTERVAL,
            import_interval: DFLT_IMPORT_INTERVAL,
            zserv_path: ZSERV_PATH.into(),
        }
    }
}

// ===== impl ScanCore =====

impl ScanCore {
    pub fn new(config: ScanCfg) -> ScanCore {
        ScanCore {
            config,
            caches: Default::default(),
            connected: Default::default(),
            client: Default::default(),
            tasks: Default::default(),
        }
    }

    // Arms the periodic tasks and the resolver connection.
    pub fn start(&mut self, tx: &ProtocolInputChannelsTx) {
        self.tasks.scan = Some(tasks::scan_interval(
            self.config.scan_interval,
            &tx.scan_timer,
        ));
        self.tasks.import = Some(tasks::import_interval(
            self.config.import_interval,
            &tx.import_timer,
        ));
        self.schedule_connect(tx);
    }

    // Processes one input event to completion.
    //
    // The first instance is the default one and the only one whose RIB the
    // scan revalidates; the import scan covers them all.
    pub async fn process_protocol_msg(
        &mut self,
        instances: &mut [Bgp],
        engine: &mut dyn RouteEngine,
        msg: ProtocolInputMsg,
        tx: &ProtocolInputChannelsTx,
    ) {
        match msg {
            // Scan timer has expired.
            ProtocolInputMsg::ScanTimer(_) => {
                scan::scan(self, instances.first_mut(), engine).await;
            }
            // Import timer has expired.
            ProtocolInputMsg::ImportTimer(_) => {
                import::import(self, instances, engine).await;
            }
            // Routing service connection was established.
            ProtocolInputMsg::Connect(mut msg) => {
                if let Some(stream) = msg.stream() {
                    self.attach_resolver(stream);
                }
            }
        }

        // Re-arm the connection if it dropped during the work item.
        self.schedule_connect(tx);
    }

    // Hands an established routing service connection to the client.
    pub fn attach_resolver(&mut self, stream: UnixStream) {
        self.client.attach(stream);
        self.tasks.connect = None;
    }

    // Spawns the connect task unless a connection is already established or
    // underway.
    pub fn schedule_connect(&mut self, tx: &ProtocolInputChannelsTx) {
        if self.client.is_connected() || self.tasks.connect.is_some() {
            return;
        }
        self.tasks.connect = Some(tasks::connect(
            self.config.zserv_path.clone(),
            &tx.connect,
        ));
    }

    // Registers an interface address notification.
    pub fn connected_add(&mut self, iface: &Interface, addr: &IpNetwork) {
        self.connected.add(iface, addr);
    }

    // Unregisters an interface address notification.
    pub fn connected_delete(&mut self, iface: &Interface, addr: &IpNetwork) {
        self.connected.delete(iface, addr);
    }

    // Returns true if the nexthop address lies on a connected network.
    pub fn nexthop_onlink(&self, attr: &NexthopAttr) -> bool {
        self.connected.onlink(attr)
    }

    // Returns true if the nexthop is one of the local interface addresses.
    pub fn nexthop_self(&self, attr: &NexthopAttr) -> bool {
        self.connected.nexthop_self(attr)
    }

    // Returns true if the nexthop and the peer share a multiaccess subnet.
    //
    // `peer` is the peer's textual host address; while the scan is disabled
    // (no resolver connection) no subnet is considered shared.
    pub fn multiaccess_check(&self, nexthop: Ipv4Addr, peer: &str) -> bool {
        let Ok(peer) = peer.parse::<Ipv4Addr>() else {
            return false;
        };

        if !self.client.is_connected() {
            return false;
        }

        self.connected.same_multiaccess(nexthop, peer)
    }

    // Reconfigures the scan interval and reschedules the scan timer.
    pub fn set_scan_interval(&mut self, seconds: u16) {
        let seconds = seconds.clamp(MIN_SCAN_INTERVAL, MAX_SCAN_INTERVAL);
        self.config.scan_interval = seconds;
        if let Some(task) = &mut self.tasks.scan {
            task.reset(Some(Duration::from_secs(seconds.into())));
        }
    }

    // Restores the default scan interval.
    pub fn reset_scan_interval(&mut self) {
        self.set_scan_interval(DFLT_SCAN_INTERVAL);
    }

    pub fn scan_interval(&self) -> u16 {
        self.config.scan_interval
    }

    pub fn is_scan_running(&self) -> bool {
        self.tasks.scan.is_some()
    }

    // Emits the non-default pieces of the running configuration.
    pub fn config_write(&self) -> Option<String> {
        (self.config.scan_interval != DFLT_SCAN_INTERVAL)
            .then(|| format!(" bgp scan-time {}\n", self.config.scan_interval))
    }

    // Renders the scan status, the active nexthop caches and the connected
    // tables.
    pub fn show(&self, detail: bool) -> String {
        let mut buf = String::new();

        if self.is_scan_running() {
            let _ = writeln!(buf, "BGP scan is running");
        } else {
            let _ = writeln!(buf, "BGP scan is not running");
        }
        let _ = writeln!(
            buf,
            "BGP scan interval is {}",
            self.config.scan_interval
        );

        let _ = writeln!(buf, "Current BGP nexthop cache:");
        show_cache(&mut buf, &self.caches.ipv4, detail);
        show_cache(&mut buf, &self.caches.ipv6, detail);

        let _ = writeln!(buf, "BGP connected route:");
        for prefix in self.connected.ipv4_prefixes() {
            let _ = writeln!(buf, " {prefix}");
        }
        for prefix in self.connected.ipv6_prefixes() {
            let _ = writeln!(buf, " {prefix}");
        }

        buf
    }
}

// ===== helper functions =====

// Renders the active generation of one address family's nexthop cache.
fn show_cache<A>(buf: &mut String, cache: &NexthopCache<A>, detail: bool)
where
    A: AddressFamily,
{
    for (prefix, bnc) in cache.active().iter() {
        let prefix: IpNetwork = (*prefix).into();
        if bnc.valid {
            let _ = writeln!(
                buf,
                " {} valid [IGP metric {}]",
                prefix.ip(),
                bnc.metric
            );
            if detail {
                for nexthop in &bnc.nexthops {
                    let _ = match nexthop {
                        Nexthop::Ipv4 { gate } => {
                            writeln!(buf, "  gate {gate}")
                        }
                        Nexthop::Ipv6 { gate } => {
                            writeln!(buf, "  gate {gate}")
                        }
                        Nexthop::Ifindex { ifindex } => {
                            writeln!(buf, "  ifidx {ifindex}")
                        }
                        nexthop => writeln!(
                            buf,
                            "  invalid nexthop type {}",
                            nexthop.nh_type()
                        ),
                    };
                }
            }
        } else {
            let _ = writeln!(buf, " {} invalid", prefix.ip());
        }
    }
}

// ===== impl ProtocolInputChannelsRx =====

impl ProtocolInputChannelsRx {
    pub async fn recv(&mut self) -> Option<ProtocolInputMsg> {
        tokio::select! {
            biased;
            msg = self.connect.recv() => {
                msg.map(ProtocolInputMsg::Connect)
            }
            msg = self.scan_timer.recv() => {
                msg.map(ProtocolInputMsg::ScanTimer)
            }
            msg = self.import_timer.recv() => {
                msg.map(ProtocolInputMsg::ImportTimer)
            }
        }
    }
}

// ===== global functions =====

pub fn protocol_input_channels()
-> (ProtocolInputChannelsTx, ProtocolInputChannelsRx) {
    let (scan_timerp, scan_timerc) = mpsc::channel(4);
    let (import_timerp, import_timerc) = mpsc::channel(4);
    let (connectp, connectc) = mpsc::channel(4);

    let tx = ProtocolInputChannelsTx {
        scan_timer: scan_timerp,
        import_timer: import_timerp,
        connect: connectp,
    };
    let rx = ProtocolInputChannelsRx {
        scan_timer: scan_timerc,
        import_timer: import_timerc,
        connect: connectc,
    };

    (tx, rx)
}

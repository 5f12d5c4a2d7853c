//! The frame pipeline: stdin poses → classify/debounce/synthesize →
//! command sink.
//!
//! Three stages on three threads, connected by bounded channels. The
//! pose channel drops the *oldest* pending frame on overflow (mapping
//! must never stall behind a bursty source); the command channel drops
//! the *newest* command on overflow (mapping must never block on a
//! slow sink).

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{RecvTimeoutError, TrySendError, bounded, unbounded};
use log::{error, info, warn};
use notify::{RecursiveMode, Watcher};
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::{Child, Command as Process, Stdio},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crate::config::ConfigStore;
use crate::mapper::GestureMapper;
use crate::pose::HandPose;
use crate::protocol;

const POSE_QUEUE: usize = 8;
const CMD_QUEUE: usize = 32;

#[derive(Debug, Default)]
pub struct PipelineOptions {
    pub profile: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Spawn this HID driver binary and feed it; stdout otherwise.
    pub driver_bin: Option<PathBuf>,
}

/// Where finished command lines go: our stdout, or a spawned driver
/// process (which owns the actual virtual device).
enum CommandSink {
    Stdout(io::Stdout),
    Driver(Child),
}

impl CommandSink {
    fn stdout() -> Self {
        CommandSink::Stdout(io::stdout())
    }

    fn spawn_driver(bin: &PathBuf, width: u32, height: u32) -> Result<Self> {
        let child = Process::new(bin)
            .arg(width.to_string())
            .arg(height.to_string())
            .stdin(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn driver {}", bin.display()))?;
        info!("started HID driver {} (pid={})", bin.display(), child.id());
        Ok(CommandSink::Driver(child))
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        match self {
            CommandSink::Stdout(out) => {
                let mut lock = out.lock();
                writeln!(lock, "{line}")?;
                lock.flush()?;
            }
            CommandSink::Driver(child) => {
                let stdin = child
                    .stdin
                    .as_mut()
                    .ok_or_else(|| anyhow!("driver stdin closed"))?;
                writeln!(stdin, "{line}")?;
                stdin.flush()?;
            }
        }
        Ok(())
    }

    /// Send the QUIT sentinel to a spawned driver and wait for it,
    /// bounded; kill it if it refuses to die.
    fn finish(self) -> Result<()> {
        if let CommandSink::Driver(mut child) = self {
            if let Some(stdin) = child.stdin.as_mut() {
                let _ = writeln!(stdin, "{}", protocol::QUIT);
                let _ = stdin.flush();
            }
            drop(child.stdin.take());
            let deadline = Instant::now() + Duration::from_secs(3);
            loop {
                match child.try_wait()? {
                    Some(status) => {
                        info!("driver exited: {status}");
                        break;
                    }
                    None if Instant::now() >= deadline => {
                        warn!("driver did not exit after QUIT; killing");
                        let _ = child.kill();
                        let _ = child.wait();
                        break;
                    }
                    None => thread::sleep(Duration::from_millis(50)),
                }
            }
        }
        Ok(())
    }
}

pub fn run(opts: PipelineOptions) -> Result<()> {
    let mut cfg = ConfigStore::load_or_install_default()?;
    if let Some(name) = &opts.profile {
        cfg.set_active(name)?;
    }
    info!("active profile '{}'", cfg.active_name);

    let mut screen = cfg.profile.screen.clone();
    if let Some(w) = opts.width {
        screen.width = w;
    }
    if let Some(h) = opts.height {
        screen.height = h;
    }
    info!("mapping to {}x{}", screen.width, screen.height);

    let sink = match &opts.driver_bin {
        Some(bin) => CommandSink::spawn_driver(bin, screen.width, screen.height)?,
        None => CommandSink::stdout(),
    };

    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&stop))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&stop))?;

    // Profile hot reload: any change under the profiles dir queues a
    // reload, applied between frames.
    let (reload_tx, reload_rx) = unbounded::<()>();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(ev) = res {
            if ev.kind.is_modify() || ev.kind.is_create() {
                let _ = reload_tx.send(());
            }
        }
    })?;
    if let Err(e) = watcher.watch(&cfg.profiles_dir, RecursiveMode::NonRecursive) {
        warn!("profile watch unavailable: {e}");
    }

    let (pose_tx, pose_rx) = bounded::<HandPose>(POSE_QUEUE);
    let (cmd_tx, cmd_rx) = bounded::<String>(CMD_QUEUE);

    // Reader stage. Detached: a blocked stdin read cannot be joined,
    // so shutdown relies on the stop flag plus process exit.
    {
        let stop = Arc::clone(&stop);
        let drain = pose_rx.clone();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        error!("stdin read failed: {e}");
                        break;
                    }
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let pose: HandPose = match serde_json::from_str(trimmed) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("unparseable pose line dropped: {e}");
                        continue;
                    }
                };
                if let Err(e) = pose.validate() {
                    warn!("invalid pose dropped: {e}");
                    continue;
                }
                let mut item = pose;
                loop {
                    match pose_tx.try_send(item) {
                        Ok(()) => break,
                        Err(TrySendError::Full(back)) => {
                            // shed the oldest queued frame
                            let _ = drain.try_recv();
                            item = back;
                        }
                        Err(TrySendError::Disconnected(_)) => return,
                    }
                }
            }
            // EOF from the pose source ends the session
            stop.store(true, Ordering::Relaxed);
        });
    }

    // Writer stage: drains until the command channel disconnects, then
    // shuts the sink down.
    let writer = {
        let mut sink = sink;
        thread::spawn(move || {
            while let Ok(line) = cmd_rx.recv() {
                if let Err(e) = sink.write_line(&line) {
                    error!("command sink failed: {e}");
                    break;
                }
            }
            if let Err(e) = sink.finish() {
                warn!("sink shutdown: {e}");
            }
        })
    };

    // Map stage, on this thread.
    let mut mapper = GestureMapper::new(cfg.profile.thresholds.clone(), screen);
    let mut frames: u64 = 0;
    let mut stat_t0 = Instant::now();
    info!("pipeline running; feed one pose JSON object per line on stdin");

    while !stop.load(Ordering::Relaxed) {
        if reload_rx.try_recv().is_ok() {
            // coalesce bursts of filesystem events
            while reload_rx.try_recv().is_ok() {}
            match cfg.reload() {
                Ok(()) => {
                    mapper.set_thresholds(cfg.profile.thresholds.clone());
                    info!("profile '{}' reloaded", cfg.active_name);
                }
                Err(e) => warn!("profile reload failed, keeping last good: {e}"),
            }
        }

        let pose = match pose_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(p) => p,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        for cmd in mapper.map(&pose) {
            // drop the newest command if the sink lags
            let _ = cmd_tx.try_send(cmd.to_string());
        }

        frames += 1;
        let elapsed = stat_t0.elapsed();
        if elapsed >= Duration::from_secs(5) {
            info!(
                "throughput: {:.1} frames/s, active gesture {}",
                frames as f64 / elapsed.as_secs_f64(),
                mapper.active_label().as_str()
            );
            frames = 0;
            stat_t0 = Instant::now();
        }
    }

    info!("shutting down");
    drop(cmd_tx);
    if writer.join().is_err() {
        warn!("writer thread panicked during shutdown");
    }
    Ok(())
}

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use rtsp_live::media::h264::H264Packetizer;
use rtsp_live::transport::UdpTransportFactory;
use rtsp_live::{Dispatcher, MediaFrame, Session, SessionConfig, StreamParams};

#[derive(Parser)]
#[command(
    name = "rtsp-push",
    about = "Push an H.264 Annex B file to a unicast RTP viewer"
)]
struct Args {
    /// H.264 Annex B elementary stream to loop
    #[arg(long, short, default_value = "test.264")]
    file: PathBuf,

    /// Viewer RTP address (ip:port)
    #[arg(long, short, default_value = "127.0.0.1:5000")]
    dest: SocketAddr,

    /// Local UDP port to send from (0 picks one)
    #[arg(long, default_value_t = 0)]
    local_port: u16,

    /// Frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// RTP payload budget in bytes
    #[arg(long, default_value_t = rtsp_live::media::DEFAULT_MTU)]
    mtu: usize,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let data = match std::fs::read(&args.file) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.file.display(), e);
            return;
        }
    };

    let frames = access_units(&data);
    if frames.is_empty() {
        eprintln!("No H.264 access units found in {}", args.file.display());
        return;
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        thread::spawn(move || {
            let mut input = String::new();
            if stop_requested(io::stdin().read_line(&mut input)) {
                running.store(false, Ordering::SeqCst);
            }
        });
    }

    println!(
        "Pushing {} access units to {} at {} fps, press Enter to stop",
        frames.len(),
        args.dest,
        args.fps
    );

    if let Err(e) = run(&args, &frames, &running) {
        eprintln!("Streaming failed: {}", e);
    }
}

fn run(args: &Args, frames: &[Vec<u8>], running: &AtomicBool) -> rtsp_live::Result<()> {
    let dispatcher = Dispatcher::new();
    let stream_id = dispatcher.add_stream(StreamParams {
        mtu: args.mtu,
        ..StreamParams::default()
    })?;

    let max_packet_size = dispatcher
        .stream(stream_id)
        .map(|s| s.max_packet_size())
        .ok_or(rtsp_live::LiveError::StreamNotFound(stream_id))?;
    let config = SessionConfig {
        max_packet_size,
        ..SessionConfig::default()
    };
    let session = dispatcher.add_session(Session::with_config(
        Arc::new(UdpTransportFactory),
        config,
    ));
    session.add_unicast_stream(
        stream_id,
        args.local_port,
        &args.dest.ip().to_string(),
        args.dest.port(),
    )?;
    session.activate_stream(stream_id);
    dispatcher.subscribe(stream_id, session.id())?;

    let interval = Duration::from_secs(1) / args.fps.max(1);
    let start = Instant::now();
    let mut pushed = 0u64;
    let log_every = log_interval(args.fps);

    for frame in frames.iter().cycle() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let ts_ms = start.elapsed().as_millis() as u64;
        let report = dispatcher.push_frame(stream_id, &MediaFrame::new(frame, ts_ms))?;
        pushed += 1;
        if report.failed > 0 {
            tracing::warn!(failed = report.failed, "frame delivery failed");
        }
        if pushed % log_every == 0 {
            tracing::info!(frames = pushed, stats = ?session.stats(), "streaming");
        }
        thread::sleep(interval);
    }

    let session_id = session.id().to_string();
    drop(session);
    dispatcher.remove_session(&session_id);
    tracing::info!(frames = pushed, "stopped");
    Ok(())
}

/// Whether a stdin read means the user pressed Enter. A closed stdin
/// (`</dev/null`, service managers) reads 0 bytes and must not stop the
/// stream.
fn stop_requested(read: io::Result<usize>) -> bool {
    matches!(read, Ok(n) if n > 0)
}

/// Frames between progress log lines: about every ten seconds.
fn log_interval(fps: u32) -> u64 {
    u64::from(fps.max(1)) * 10
}

/// Group Annex B NAL units into access units (H.264 §7.4.1.2.3).
///
/// A new access unit starts at an access unit delimiter, or once the
/// current unit holds a slice, at SEI/SPS/PPS or at a slice whose
/// `first_mb_in_slice` is 0. Slices of one multi-slice picture stay
/// together.
fn access_units(data: &[u8]) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    let mut current = Vec::new();
    let mut has_slice = false;

    for nal in H264Packetizer::extract_nal_units(data) {
        let nal_type = nal[0] & 0x1f;
        let starts_new = match nal_type {
            9 => true,
            6 | 7 | 8 | 14..=18 => has_slice,
            // ue(v) of 0 is the single bit `1`.
            1 | 5 => has_slice && nal.get(1).is_some_and(|b| b & 0x80 != 0),
            _ => false,
        };
        if starts_new && !current.is_empty() {
            frames.push(std::mem::take(&mut current));
            has_slice = false;
        }

        current.extend_from_slice(&[0, 0, 0, 1]);
        current.extend_from_slice(nal);
        has_slice |= matches!(nal_type, 1 | 5);
    }
    if !current.is_empty() {
        frames.push(current);
    }
    frames
}

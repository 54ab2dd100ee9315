use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();

    #[cfg(feature = "camera-nokhwa")]
    return live::run();

    #[cfg(not(feature = "camera-nokhwa"))]
    anyhow::bail!("pose-overlay was built without the camera-nokhwa feature");
}

#[cfg(feature = "camera-nokhwa")]
mod live {
    use std::io::BufRead;
    use std::thread;

    use anyhow::{Result, bail};
    use crossbeam_channel::{Receiver, unbounded};
    use pose_overlay::{
        FlashToggle, HandOverlay, HandOverlayConfig, NoTorch, Scene, camera, model_download,
        pipeline::{frame_channel, recv_latest_frame},
        raycast::PlaneRaycaster,
        vision::OrtHandPoseEstimator,
    };

    enum Command {
        Flash,
        Quit,
    }

    fn spawn_command_reader() -> Receiver<Command> {
        let (tx, rx) = unbounded();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let command = match line.trim() {
                    "" => continue,
                    "flash" | "f" => Command::Flash,
                    "quit" | "q" => Command::Quit,
                    other => {
                        log::warn!("unknown command: {other}");
                        continue;
                    }
                };
                let quit = matches!(command, Command::Quit);
                if tx.send(command).is_err() || quit {
                    break;
                }
            }
        });
        rx
    }

    pub fn run() -> Result<()> {
        let model_path = model_download::default_model_path();
        model_download::ensure_model_available(&model_path)?;
        let estimator = OrtHandPoseEstimator::new(&model_path)?;
        log::info!("hand landmark model ready at {}", model_path.display());

        let device = camera::default_camera()?;
        log::info!("using camera: {}", device.label);
        let (frame_tx, frame_rx) = frame_channel();
        let stream = camera::start_camera_stream(device.index.clone(), frame_tx)?;

        let commands = spawn_command_reader();
        println!("commands: flash (toggle torch), quit");

        let Some(first) = recv_latest_frame(&frame_rx) else {
            bail!("camera stream ended before the first frame");
        };

        let raycaster = PlaneRaycaster::for_image(first.width, first.height);
        let mut overlay = HandOverlay::new(
            Box::new(estimator),
            Box::new(raycaster),
            HandOverlayConfig::default(),
        );
        let mut scene = Scene::new();
        let mut flash = FlashToggle::new(Box::new(NoTorch));

        let mut frames: u64 = 0;
        let mut frame = first;
        loop {
            for command in commands.try_iter() {
                match command {
                    Command::Flash => {
                        let on = flash.toggle();
                        println!("flash {}", if on { "on" } else { "off" });
                    }
                    Command::Quit => {
                        stream.stop();
                        return Ok(());
                    }
                }
            }

            let stats = overlay.process_frame(&mut scene, &frame);
            frames += 1;
            log::debug!(
                "frame {frames} processed {:?} after capture: {stats:?}",
                frame.timestamp.elapsed()
            );
            if frames % 30 == 0 {
                if stats.hand_detected {
                    log::info!(
                        "{} scene nodes; last frame refreshed {} markers, {} bones ({} ray misses)",
                        scene.len(),
                        stats.markers_refreshed,
                        stats.bones_refreshed,
                        stats.raycast_misses,
                    );
                } else {
                    log::info!("{} scene nodes; no hand in view", scene.len());
                }
            }

            frame = match recv_latest_frame(&frame_rx) {
                Some(next) => next,
                None => break,
            };
        }

        stream.stop();
        Ok(())
    }
}

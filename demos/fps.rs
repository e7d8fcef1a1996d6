//! First-person controller driven by simulated native input.
//!
//! WASD / arrow keys move the player, mouse motion turns the head. The
//! headless engine stands in for the native loop: the demo fires the
//! callbacks a real engine would and pumps the runtime between them.
//!
//! ```sh
//! RUST_LOG=info cargo run --example fps
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use glam::{EulerRot, Vec3};
use pge::bridge::{KeyCode, WindowConfig};
use pge::scene::{Camera, NodeKey};
use pge::{Runtime, RuntimeSettings};

const MOVE_SPEED: f32 = 4.0;
const LOOK_SENSITIVITY: f32 = 0.002;

/// Direction the held keys point at, in the player's local frame.
#[derive(Default)]
struct MoveIntent {
    forward: Cell<f32>,
    right: Cell<f32>,
}

impl MoveIntent {
    fn apply(&self, key: KeyCode, pressed: bool) {
        let amount = if pressed { 1.0 } else { 0.0 };
        match key {
            KeyCode::W | KeyCode::ArrowUp => self.forward.set(amount),
            KeyCode::S | KeyCode::ArrowDown => self.forward.set(-amount),
            KeyCode::D | KeyCode::ArrowRight => self.right.set(amount),
            KeyCode::A | KeyCode::ArrowLeft => self.right.set(-amount),
        }
    }

    fn local_direction(&self) -> Vec3 {
        Vec3::new(self.right.get(), 0.0, -self.forward.get()).normalize_or_zero()
    }
}

struct Player {
    body: NodeKey,
    head: NodeKey,
}

fn spawn_player(runtime: &mut Runtime) -> anyhow::Result<(Player, pge::scene::CameraKey)> {
    let graph = &mut runtime.graph;
    let body = graph.create_named_node("player");
    let head = graph.create_named_node("head");
    graph.attach(head, body)?;
    graph.set_translation(head, Vec3::new(0.0, 1.7, 0.0))?;
    let camera = graph.attach_camera(head, Camera::new_perspective(75.0, 16.0 / 9.0, 0.05, 500.0))?;
    Ok((Player { body, head }, camera))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (mut runtime, engine) = Runtime::headless(RuntimeSettings::default().with_max_windows(1));

    let (player, camera) = spawn_player(&mut runtime)?;
    let level = runtime.graph.create_named_node("level");
    runtime.graph.create_scene("fps", &[player.body, level])?;

    let pending = runtime.create_window(WindowConfig::new().title("Fps shooter").ui(camera));
    runtime.process_events();
    let window = pollster::block_on(pending)?;

    let intent = Rc::new(MoveIntent::default());
    let pitch = Rc::new(Cell::new(0.0_f32));

    let keys = intent.clone();
    runtime.bridge_mut().on_keyboard(window, move |_, event| {
        if let Some(key) = event.key() {
            keys.apply(key, event.pressed);
        }
        Ok(())
    })?;

    let head_pitch = pitch.clone();
    let Player { body, head } = player;
    runtime.bridge_mut().on_mouse_moved(window, move |ctx, event| {
        ctx.graph.rotate_euler(body, EulerRot::YXZ, -event.dx * LOOK_SENSITIVITY, 0.0, 0.0)?;
        let limit = std::f32::consts::FRAC_PI_2 - 0.01;
        let next = (head_pitch.get() - event.dy * LOOK_SENSITIVITY).clamp(-limit, limit);
        head_pitch.set(next);
        ctx.graph.set_rotation(head, glam::Quat::from_rotation_x(next))
    })?;

    let movement = intent.clone();
    runtime.bridge_mut().on_process(window, move |ctx, dt| {
        let local = movement.local_direction();
        if local == Vec3::ZERO {
            return Ok(());
        }
        let facing = ctx.graph.node(body)?.rotation();
        ctx.graph.translate(body, facing * local * MOVE_SPEED * dt)
    })?;

    // Scripted input: walk forward, strafe right while turning, then stop.
    let script: [(u32, &[(KeyCode, bool)], (f32, f32)); 4] = [
        (30, &[(KeyCode::W, true)], (0.0, 0.0)),
        (30, &[(KeyCode::D, true)], (12.0, -3.0)),
        (30, &[(KeyCode::W, false)], (0.0, 0.0)),
        (10, &[(KeyCode::D, false)], (0.0, 0.0)),
    ];

    for (frames, presses, (dx, dy)) in script {
        for &(key, pressed) in presses {
            engine.fire_keyboard(key.code(), pressed);
        }
        for _ in 0..frames {
            if dx != 0.0 || dy != 0.0 {
                engine.fire_mouse_moved(dx, dy);
            }
            engine.fire_process();
            runtime.pump()?;
            std::thread::sleep(Duration::from_millis(16));
        }
    }

    let world = runtime.graph.world_transform(head)?;
    log::info!(
        "Player ended at {:?}, looking along {:?} (pitch {:.2} rad)",
        runtime.graph.node(body)?.translation(),
        world.transform_vector3(Vec3::NEG_Z),
        pitch.get()
    );
    log::info!("{} frames, {:.2}s simulated", runtime.frame_count(), runtime.time());

    runtime.shutdown();
    Ok(())
}

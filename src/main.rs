use ik_sim::demo::{build_sorting_scene, room_physics, BallSpawner};
use ik_sim::{collect_instances, ComponentKind, EntityStore, SimulationConfig};

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u32 = 60 * 30;

fn run() -> ik_sim::Result<()> {
    let config = SimulationConfig::default().with_physics(room_physics());
    let mut sim = build_sorting_scene(config)?;
    let mut spawner = BallSpawner::default();

    let mut pick_ups = 0;
    let mut releases = 0;

    for frame in 0..FRAMES {
        let (scene, rng) = sim.scene_and_rng_mut();
        spawner.update(scene, FRAME_DT, rng)?;

        let report = sim.tick(FRAME_DT);
        pick_ups += report.ik.pick_ups();
        releases += report.ik.releases();

        if frame % 300 == 0 {
            let instances = collect_instances(sim.scene());
            log::info!(
                "t={:.1}s balls={} instances={} contacts={}/{} walls={}",
                sim.elapsed(),
                sim.scene().query(ComponentKind::Ball).len(),
                instances.len(),
                report.physics.ball_contacts,
                report.physics.box_contacts,
                report.physics.wall_hits,
            );
        }
    }

    let scene = sim.scene();
    let mut sorted = [0usize; 2];
    for id in scene.query(ComponentKind::Ball) {
        let (Some(position), Some(key)) = (scene.position(id), scene.sort_key(id)) else {
            continue;
        };
        // Container floors sit at z around 1.0, left for key 0, right otherwise.
        if position.z > 0.6 && position.y < 0.5 {
            let expected_left = key == 0;
            if (position.x < 0.0) == expected_left {
                sorted[usize::from(!expected_left)] += 1;
            }
        }
    }

    log::info!(
        "done after {:.1}s: spawned {} balls, {} pick-ups, {} releases, sorted {}/{}",
        sim.elapsed(),
        spawner.spawned(),
        pick_ups,
        releases,
        sorted[0],
        sorted[1],
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("simulation failed: {}", err);
        std::process::exit(1);
    }
}

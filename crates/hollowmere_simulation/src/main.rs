//! Headless прогон Hollowmere
//!
//! Игрок со скриптованным input гоняется за ближайшим живым врагом и
//! машет мечом; полезно для smoke-прогона симуляции без рендера.

use bevy::prelude::*;
use hollowmere_simulation::*;

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    let player = spawn_player(app.world_mut(), Vec2::ZERO);
    for position in [
        Vec2::new(4.0, 0.0),
        Vec2::new(-3.0, 2.0),
        Vec2::new(0.0, -4.0),
    ] {
        spawn_enemy(app.world_mut(), position);
    }

    log_info(&format!("Hollowmere headless run (seed: {})", seed));

    for tick in 0..1800 {
        let Some(player_health) = app.world().get::<Health>(player).copied() else {
            log_info("Player despawned, stopping");
            break;
        };
        if !player_health.is_alive() {
            log_info("Player died, stopping");
            break;
        }

        let player_position = app
            .world()
            .get::<Transform>(player)
            .map(|t| t.translation.truncate())
            .unwrap_or(Vec2::ZERO);

        // Ближайший живой враг — цель скрипта
        let nearest_enemy = {
            let world = app.world_mut();
            let mut actors = world.query::<(&Actor, &Transform, &Health)>();
            actors
                .iter(world)
                .filter(|(actor, _, health)| {
                    actor.category == Category::Enemy && health.is_alive()
                })
                .map(|(_, transform, _)| transform.translation.truncate())
                .min_by(|a, b| {
                    a.distance(player_position)
                        .total_cmp(&b.distance(player_position))
                })
        };

        {
            let mut input = app.world_mut().resource_mut::<PlayerInput>();
            match nearest_enemy {
                Some(enemy_position) => {
                    let to_enemy = enemy_position - player_position;
                    input.axis = if to_enemy.length() > 0.8 {
                        to_enemy.normalize_or_zero()
                    } else {
                        Vec2::ZERO
                    };
                    // Замах каждые полсекунды, когда враг в радиусе
                    input.attack_pressed = to_enemy.length() <= 1.0 && tick % 30 == 0;
                }
                None => {
                    input.axis = Vec2::ZERO;
                    input.attack_pressed = false;
                }
            }
        }

        app.update();

        if tick % 300 == 0 {
            log_info(&format!(
                "Tick {}: player HP {}/{}",
                tick, player_health.current, player_health.max
            ));
        }

        if nearest_enemy.is_none() {
            log_info(&format!("All enemies down at tick {}", tick));
            break;
        }
    }

    let survivors = {
        let world = app.world_mut();
        let mut actors = world.query::<(&Actor, &Health)>();
        actors
            .iter(world)
            .filter(|(actor, health)| actor.category == Category::Enemy && health.is_alive())
            .count()
    };
    log_info(&format!("Run complete: {} enemies alive", survivors));
}

//! Combat integration tests: headless App, ручные тики (1 update = 1/60s).
//!
//! Сценарии из боевого контракта: multi-hit игрока, промах на wind-up,
//! смерть ровно один раз, grace-деспавн, transient-визуал.

use bevy::prelude::*;
use hollowmere_simulation::*;

/// Helper: полный App симуляции
fn create_sim_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

/// Враг, который стоит на месте (для точного позиционирования в сценарии)
fn spawn_static_enemy(app: &mut App, position: Vec2) -> Entity {
    let enemy = spawn_enemy(app.world_mut(), position);
    app.world_mut()
        .get_mut::<EnemyStats>(enemy)
        .unwrap()
        .move_speed = 0.0;
    enemy
}

fn press_attack(app: &mut App) {
    app.world_mut().resource_mut::<PlayerInput>().attack_pressed = true;
}

fn health_of(app: &App, entity: Entity) -> Option<Health> {
    app.world().get::<Health>(entity).copied()
}

fn count_damage_numbers(app: &mut App) -> usize {
    let world = app.world_mut();
    let mut numbers = world.query::<&DamageNumber>();
    numbers.iter(world).count()
}

/// Журнал EntityDied для проверки "смерть ровно один раз"
#[derive(Resource, Default)]
struct DeathLog(Vec<Entity>);

fn record_deaths(mut events: EventReader<EntityDied>, mut log: ResMut<DeathLog>) {
    for event in events.read() {
        log.0.push(event.entity);
    }
}

fn with_death_log(app: &mut App) {
    app.init_resource::<DeathLog>();
    app.add_systems(FixedUpdate, record_deaths.after(SimSet::Combat));
}

#[test]
fn test_player_attack_hits_multiple_enemies() {
    let mut app = create_sim_app(42);

    let _player = spawn_player(app.world_mut(), Vec2::ZERO);
    // Враг A на 0.5, враг B на 1.0 — оба внутри attack_range 1.2
    let enemy_a = spawn_static_enemy(&mut app, Vec2::new(0.5, 0.0));
    let enemy_b = spawn_static_enemy(&mut app, Vec2::new(1.0, 0.0));

    press_attack(&mut app);
    run_ticks(&mut app, 5);

    // Обе цели получили attack_damage 20 в одной активации
    assert_eq!(health_of(&app, enemy_a).unwrap().current, 80);
    assert_eq!(health_of(&app, enemy_b).unwrap().current, 80);
}

#[test]
fn test_enemy_out_of_range_takes_no_damage() {
    let mut app = create_sim_app(42);

    let _player = spawn_player(app.world_mut(), Vec2::ZERO);
    let far_enemy = spawn_static_enemy(&mut app, Vec2::new(2.0, 0.0)); // > 1.2

    press_attack(&mut app);
    run_ticks(&mut app, 5);

    assert_eq!(health_of(&app, far_enemy).unwrap().current, 100);
}

#[test]
fn test_enemy_attack_lands_on_player_in_range() {
    let mut app = create_sim_app(42);

    let player = spawn_player(app.world_mut(), Vec2::ZERO);
    let _enemy = spawn_static_enemy(&mut app, Vec2::new(0.5, 0.0));

    // 1 секунда: триггер → windup 0.2 → удар 10 → recovery 0.3 → ре-триггер
    run_ticks(&mut app, 60);

    let health = health_of(&app, player).unwrap();
    assert!(
        health.current == 80 || health.current == 90,
        "expected 1-2 enemy hits, player HP = {}",
        health.current
    );
    // Урон всегда кратен attack_damage врага
    assert_eq!((health.max - health.current) % 10, 0);
}

#[test]
fn test_windup_misses_when_target_leaves_range() {
    let mut app = create_sim_app(42);

    let player = spawn_player(app.world_mut(), Vec2::new(0.5, 0.0));
    let enemy = spawn_static_enemy(&mut app, Vec2::ZERO);

    // Враг замечает игрока и начинает замах
    run_ticks(&mut app, 4);
    assert!(
        app.world().get::<MeleeAttackState>(enemy).is_some(),
        "enemy should have started the attack"
    );

    // Игрок телепортируется за пределы attack_range до истечения wind-up
    app.world_mut()
        .get_mut::<Transform>(player)
        .unwrap()
        .translation = Vec3::new(10.0, 0.0, 0.0);

    // Wind-up истекает (0.2s = 12 тиков) — ре-валидация промахивается
    run_ticks(&mut app, 25);
    assert_eq!(
        health_of(&app, player).unwrap().current,
        100,
        "out-of-range windup must not deal damage"
    );

    // Recovery (0.3s) всё равно доходит до конца и снимает Attacking
    run_ticks(&mut app, 25);
    assert!(app.world().get::<MeleeAttackState>(enemy).is_none());
    let state = app.world().get::<EnemyState>(enemy).unwrap();
    assert!(
        matches!(state, EnemyState::Patrolling | EnemyState::Waiting { .. }),
        "enemy should resume movement FSM, got {:?}",
        state
    );
}

#[test]
fn test_enemy_dies_once_and_despawns_after_grace() {
    let mut app = create_sim_app(42);
    with_death_log(&mut app);

    let player = spawn_player(app.world_mut(), Vec2::ZERO);
    let enemy = spawn_static_enemy(&mut app, Vec2::new(0.5, 0.0));

    // 100 HP / 20 за удар → 5 ударов; бьём чаще, чем нужно, лишние
    // замахи после смерти должны быть no-op
    for tick in 0..90 {
        if tick % 20 == 0 {
            press_attack(&mut app);
        }
        app.update();
    }

    // Враг мёртв и деспавнут после grace-задержки
    assert!(health_of(&app, enemy).is_none(), "enemy should be despawned");

    // Число урона от последнего удара переживает свою цель
    assert!(
        count_damage_numbers(&mut app) >= 1,
        "damage number should outlive its target"
    );

    run_ticks(&mut app, 50);
    assert_eq!(count_damage_numbers(&mut app), 0);

    // EntityDied ровно один раз, и только для врага
    let deaths = &app.world().resource::<DeathLog>().0;
    assert_eq!(deaths.len(), 1, "death notification must fire exactly once");
    assert_eq!(deaths[0], enemy);

    // Игрок пережил обмен ударами
    assert!(health_of(&app, player).unwrap().is_alive());
}

#[test]
fn test_enemy_death_cancels_pending_windup() {
    let mut app = create_sim_app(42);

    let player = spawn_player(app.world_mut(), Vec2::ZERO);
    let enemy = spawn_static_enemy(&mut app, Vec2::new(0.5, 0.0));

    // Ваншот, чтобы убить врага посреди его wind-up (0.2s = 12 тиков)
    app.world_mut()
        .get_mut::<PlayerStats>(player)
        .unwrap()
        .attack_damage = 200;

    // Тик 1: враг начинает замах по игроку
    run_ticks(&mut app, 2);
    assert!(app.world().get::<MeleeAttackState>(enemy).is_some());

    press_attack(&mut app);
    run_ticks(&mut app, 30);

    // Замах умершего врага не дошёл до коммита
    assert!(health_of(&app, enemy).is_none());
    assert_eq!(
        health_of(&app, player).unwrap().current,
        100,
        "a dead attacker's pending windup must not deal damage"
    );
}

#[test]
fn test_damage_feedback_lifecycle() {
    let mut app = create_sim_app(42);

    let player = spawn_player(app.world_mut(), Vec2::ZERO);
    // 1.1: внутри attack_range игрока (1.2), вне триггера врага (1.0)
    let enemy = spawn_static_enemy(&mut app, Vec2::new(1.1, 0.0));

    press_attack(&mut app);
    run_ticks(&mut app, 3);

    assert_eq!(health_of(&app, enemy).unwrap().current, 80);

    // Число урона заспавнено, flash на обоих, readout виден
    assert_eq!(count_damage_numbers(&mut app), 1);
    assert!(app.world().get::<HitFlash>(enemy).is_some());
    assert!(app.world().get::<HitFlash>(player).is_some());
    let readout = app.world().get::<HealthReadout>(enemy).unwrap();
    assert!(readout.is_visible());
    assert_eq!((readout.current, readout.max), (80, 100));

    // 0.66s: число урона (0.5s) и flash (0.1s) истекли, readout (3s) ещё виден
    run_ticks(&mut app, 40);
    assert_eq!(
        count_damage_numbers(&mut app),
        0,
        "damage number should expire after 0.5s"
    );
    assert!(app.world().get::<HitFlash>(enemy).is_none());
    assert!(app.world().get::<HitFlash>(player).is_none());
    assert!(app.world().get::<HealthReadout>(enemy).unwrap().is_visible());

    // Ещё 3.4s: readout автоскрылся
    run_ticks(&mut app, 205);
    assert!(!app.world().get::<HealthReadout>(enemy).unwrap().is_visible());
}

#[test]
fn test_patrol_never_drifts_beyond_radius() {
    let mut app = create_sim_app(7);

    let home = Vec2::new(3.0, -2.0);
    let enemy = spawn_enemy(app.world_mut(), home);
    let patrol_radius = app.world().get::<EnemyStats>(enemy).unwrap().patrol_radius;

    // Без игрока враг только патрулирует; 3000 тиков = 50s, десятки целей
    for tick in 0..3000 {
        app.update();

        let route = app.world().get::<PatrolRoute>(enemy).unwrap();
        assert_eq!(route.home, home, "home must never move");
        assert!(
            home.distance(route.target) <= patrol_radius + 1e-3,
            "tick {}: target {:?} outside patrol radius",
            tick,
            route.target
        );

        let position = app
            .world()
            .get::<Transform>(enemy)
            .unwrap()
            .translation
            .truncate();
        assert!(
            home.distance(position) <= patrol_radius + ARRIVAL_EPSILON,
            "tick {}: enemy wandered to {:?}",
            tick,
            position
        );
    }
}

#[test]
fn test_long_run_invariants_hold() {
    let mut app = create_sim_app(123);

    let player = spawn_player(app.world_mut(), Vec2::ZERO);
    spawn_enemy(app.world_mut(), Vec2::new(2.0, 0.0));
    spawn_enemy(app.world_mut(), Vec2::new(-2.0, 1.0));
    spawn_enemy(app.world_mut(), Vec2::new(0.0, 2.5));

    for tick in 0..1200 {
        // Скриптованный хаос: кружим и машем мечом
        {
            let angle = tick as f32 * 0.02;
            let mut input = app.world_mut().resource_mut::<PlayerInput>();
            input.axis = Vec2::new(angle.cos(), angle.sin());
            input.attack_pressed = tick % 15 == 0;
        }
        app.update();

        let world = app.world_mut();
        let mut actors = world.query::<(Entity, &Health, Option<&EnemyState>)>();
        for (entity, health, state) in actors.iter(world) {
            assert!(
                health.current <= health.max,
                "tick {}: {:?} health invariant broken",
                tick,
                entity
            );
            if let Some(EnemyState::Dead) = state {
                assert_eq!(
                    health.current, 0,
                    "tick {}: dead enemy {:?} with non-zero health",
                    tick, entity
                );
            }
        }

        if app.world().get::<Health>(player).is_none() {
            break; // игрок проиграл размен — тоже валидный исход
        }
    }
}

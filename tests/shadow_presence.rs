use nalgebra::{Point3, Vector3};
use shadowcast::core::framebuffer::DepthBuffer;
use shadowcast::core::geometry::{MeshId, VertexLayout};
use shadowcast::io::config::Config;
use shadowcast::io::obj_loader::load_obj;
use shadowcast::pipeline::passes::{FramePlan, plan_frame};
use shadowcast::pipeline::reference::{render_depth_pass, shade_point, shadow_amount};
use shadowcast::pipeline::shadow::ShadowSettings;
use shadowcast::scene::context::SceneState;

const CUBE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/cube.obj");

fn reference_frame() -> (FramePlan, DepthBuffer, ShadowSettings) {
    let mesh = load_obj(CUBE, VertexLayout::FULL).expect("bundled cube loads");
    let state = SceneState::new(&Config::default(), MeshId(0));
    let settings = ShadowSettings::default();
    let plan = plan_frame(&state, &settings);
    let depth = render_depth_pass(&plan.depth, &[mesh]);
    (plan, depth, settings)
}

fn floor_shadow(plan: &FramePlan, depth: &DepthBuffer, settings: &ShadowSettings, p: Point3<f32>) -> f32 {
    shadow_amount(
        depth,
        &plan.depth.light_space,
        settings,
        &p,
        &Vector3::y(),
        &plan.shading.light_position,
    )
}

#[test]
fn depth_pass_covers_the_casters() {
    let (_, depth, _) = reference_frame();
    assert_eq!(depth.width, 1024);
    assert!(depth.covered() > 0);
    assert!(depth.texels().iter().all(|d| (0.0..=1.0).contains(d)));
}

#[test]
fn floor_under_floating_cube_is_shadowed() {
    let (plan, depth, settings) = reference_frame();

    // The light projection is orthographic, so shadows fall along the fixed
    // direction from the light towards its target, (0.5, -1, -0.5) per unit of height.
    let under_cube2 = Point3::new(-1.2, 0.0, -4.2);
    let beside_cube1 = Point3::new(2.5, 0.0, -6.5);
    let open_floor = Point3::new(-2.0, 0.0, 2.0);

    assert_eq!(floor_shadow(&plan, &depth, &settings, under_cube2), 1.0);
    assert_eq!(floor_shadow(&plan, &depth, &settings, beside_cube1), 1.0);
    assert_eq!(floor_shadow(&plan, &depth, &settings, open_floor), 0.0);
}

#[test]
fn shadowed_floor_receives_less_light() {
    let (plan, depth, settings) = reference_frame();

    let shadowed = Point3::new(-1.2, 0.0, -4.2);
    let open = Point3::new(-2.0, 0.0, 2.0);

    let dark = shade_point(&depth, &plan.shading, &settings, &shadowed, &Vector3::y());
    let lit = shade_point(&depth, &plan.shading, &settings, &open, &Vector3::y());
    assert!(dark.x < lit.x && dark.y < lit.y && dark.z < lit.z);
}

#[test]
fn lit_cube_faces_do_not_shadow_themselves() {
    let (plan, depth, settings) = reference_frame();

    // Top face center of cube 2 faces the light.
    let top = Point3::new(-2.0, 3.0, -3.0);
    let amount = shadow_amount(
        &depth,
        &plan.depth.light_space,
        &settings,
        &top,
        &Vector3::y(),
        &plan.shading.light_position,
    );
    assert_eq!(amount, 0.0);
}

#[test]
fn light_straight_overhead_still_casts_shadows() {
    let config = Config::from_toml("[light]\nposition = [0.0, 8.0, -2.0]\n").expect("valid config");
    let mesh = load_obj(CUBE, VertexLayout::FULL).expect("bundled cube loads");
    let state = SceneState::new(&config, MeshId(0));
    let settings = ShadowSettings::from_config(&config.shadow);
    let plan = plan_frame(&state, &settings);

    assert!(plan.depth.light_space.iter().all(|v| v.is_finite()));
    let depth = render_depth_pass(&plan.depth, &[mesh]);
    assert!(depth.covered() > 0);
}

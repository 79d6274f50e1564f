//! The garden scene
//!
//! Builds the complete scene from a [`GroveConfig`]: a ground plane, a small
//! structure at the origin, a ring of randomly placed markers, an ambient
//! light, a primary point light, the animated rig lights, debug helpers and
//! an orbiting camera. Shadow participation and the tunable parameters are
//! registered here as well.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{Quat, Vec3};

use crate::animation::{AnimationClock, LightRig};
use crate::assets::{AssetServer, Geometry, Material, MaterialHandle, Side, color_hex};
use crate::config::GroveConfig;
use crate::engine::{FrameDriver, SceneContext};
use crate::errors::Result;
use crate::scene::{
    AsyncAttachQueue, Camera, Light, LightShadow, MeshShadow, Node, NodeHandle, PlacementParams,
    ProceduralPlacer, Renderable, Scene, ShadowFlags, ShadowPolicy, Transform,
};
use crate::utils::{CameraController, ParamBinding, ParamTarget, ParameterPanel};

/// A built scene plus handles to its fixed parts.
pub struct Garden {
    pub context: SceneContext,
    pub ground: NodeHandle,
    pub structure: NodeHandle,
    pub ambient_light: NodeHandle,
    pub primary_light: NodeHandle,
    pub ground_material: MaterialHandle,
    pub placement_seed: u64,
}

impl Garden {
    /// Wraps the scene in a driver ticking at the configured step.
    pub fn into_driver(self, config: &GroveConfig) -> Result<FrameDriver> {
        let clock = AnimationClock::fixed(config.frame.step()?);
        Ok(FrameDriver::new(self.context, clock).with_reorient(config.frame.reorient_instances))
    }
}

pub fn build_scene(config: &GroveConfig) -> Result<Garden> {
    let step = config.frame.step()?;
    let assets = AssetServer::new();
    let mut scene = Scene::new();
    let root = scene.root();

    // Ground
    let ground_material = assets.add_material(
        Material::new_standard("Ground", color_hex(0x00a9_c388))
            .with_roughness(0.3)
            .with_ao_map_intensity(0.6)
            .with_side(Side::Double),
    );
    let ground_renderable = Renderable::new(
        assets.add_geometry(Geometry::new_plane(10.0, 10.0)),
        ground_material,
    );
    let ground = scene.add_node(
        Node::new("Ground")
            .with_renderable(ground_renderable)
            .with_transform(Transform::new().with_rotation(Quat::from_rotation_x(-FRAC_PI_2))),
    );

    // Structure
    let structure = build_structure(&mut scene, &assets, root)?;
    let structure_parts = scene.collect_subtree(structure);

    // Placed markers
    let mut placer = match config.placement.seed {
        Some(seed) => ProceduralPlacer::with_seed(seed),
        None => ProceduralPlacer::new(),
    };
    let marker = Renderable::new(
        assets.add_geometry(Geometry::new_box(0.6, 0.8, 0.2)),
        assets.add_material(Material::new_standard("Marker", color_hex(0x00b2_b6b1))),
    );
    let placement = placer.place(
        &mut scene,
        root,
        &PlacementParams {
            name: "Marker".to_string(),
            count: config.placement.count,
            r_min: config.placement.r_min,
            r_max: config.placement.r_max,
            height: config.placement.height,
            max_tilt: config.placement.max_tilt,
            renderable: marker,
            shadows: ShadowFlags::CAST,
        },
    )?;

    // Lights
    let lights = &config.lights;
    let ambient_light = scene.add_light(
        Light::new_ambient(lights.ambient_color, lights.ambient_intensity),
        root,
    )?;
    rename(&mut scene, ambient_light, "AmbientLight");

    let primary = &lights.primary;
    let primary_light = scene.add_light(
        Light::new_point(primary.color, primary.intensity, primary.distance, primary.decay),
        root,
    )?;
    rename(&mut scene, primary_light, "PointLight");
    if let Some(node) = scene.get_node_mut(primary_light) {
        node.transform.position = primary.position;
    }

    let mut light_rig = LightRig::new();
    for rig in &lights.rig {
        light_rig.add_light(
            &mut scene,
            root,
            Light::new_point(rig.color, rig.intensity, rig.distance, rig.decay),
            rig.trajectory.clone(),
        )?;
    }

    // Helpers
    let helper_material = assets.add_material(Material::new_unlit("Helper", Vec3::ONE));
    scene.add_node(Node::new("AxesHelper").with_renderable(Renderable::new(
        assets.add_geometry(Geometry::Axes { size: 4.0 }),
        helper_material,
    )));
    scene.add_to_parent(
        Node::new("PointLightHelper").with_renderable(Renderable::new(
            assets.add_geometry(Geometry::Sphere { radius: 0.3 }),
            helper_material,
        )),
        primary_light,
    )?;

    // Camera
    let cam = &config.camera;
    let camera = Camera::new_perspective(cam.fov_degrees, cam.aspect(), cam.near, cam.far);
    let camera_node = scene.add_camera(camera, root)?;
    scene.active_camera = Some(camera_node);
    let controller = CameraController::new(cam.position, cam.target, cam.orbit)?;
    if let Some(node) = scene.get_node_mut(camera_node) {
        controller.apply_to(&mut node.transform);
    }
    let mut input = cam.input;
    input.set_screen_height(cam.height);

    // Shadows
    let shadows_cfg = &config.shadows;
    let mut policy = ShadowPolicy::builder()
        .mesh(ground, MeshShadow::RECEIVE)
        .meshes(structure_parts, MeshShadow::BOTH)
        .meshes(placement.instances().iter().map(|i| i.node), MeshShadow::CAST);
    if shadows_cfg.primary_casts {
        policy = policy.light(primary_light, LightShadow::square(shadows_cfg.primary_map_size));
    }
    if shadows_cfg.rig_casts {
        for rig_light in light_rig.lights() {
            policy = policy.light(rig_light.node, LightShadow::square(shadows_cfg.rig_map_size));
        }
    }
    let shadows = policy.build();

    // Parameters
    let mut params = ParameterPanel::new();
    params.add(ParamBinding::new(
        "PointLight Intensity",
        1.0,
        100.0,
        1.0,
        ParamTarget::LightIntensity(primary_light),
    ));
    params.add(ParamBinding::new(
        "PointLight Distance",
        0.0,
        50.0,
        0.1,
        ParamTarget::LightDistance(primary_light),
    ));
    params.add(ParamBinding::new(
        "PointLight Decay",
        0.0,
        4.0,
        0.1,
        ParamTarget::LightDecay(primary_light),
    ));
    params.add(ParamBinding::new(
        "Ambient Intensity",
        0.1,
        1.0,
        0.01,
        ParamTarget::LightIntensity(ambient_light),
    ));
    params.add(ParamBinding::new(
        "Ground AO Intensity",
        0.0,
        1.0,
        0.01,
        ParamTarget::MaterialAoIntensity(ground_material),
    ));
    params.add(ParamBinding::new(
        "Ground Roughness",
        0.0,
        1.0,
        0.01,
        ParamTarget::MaterialRoughness(ground_material),
    ));

    scene.update_matrix_world();
    let placement_seed = placer.seed();
    log::info!(
        "Garden built: {} nodes, {} markers, {} rig lights, step {:?}, seed {placement_seed}",
        scene.node_count(),
        placement.len(),
        light_rig.len(),
        step
    );

    Ok(Garden {
        context: SceneContext {
            scene,
            assets,
            light_rig,
            placements: vec![placement],
            camera: camera_node,
            controller,
            input,
            shadows,
            attach_queue: AsyncAttachQueue::new(),
            params,
        },
        ground,
        structure,
        ambient_light,
        primary_light,
        ground_material,
        placement_seed,
    })
}

/// Walls, roof and door under one group node.
fn build_structure(scene: &mut Scene, assets: &AssetServer, parent: NodeHandle) -> Result<NodeHandle> {
    let group = scene.add_to_parent(Node::new("Structure"), parent)?;

    let walls = Renderable::new(
        assets.add_geometry(Geometry::new_box(1.0, 1.0, 1.0)),
        assets.add_material(Material::new_standard("Walls", Vec3::ONE)),
    );
    scene.add_to_parent(
        Node::new("Walls")
            .with_renderable(walls)
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.51, 0.0))),
        group,
    )?;

    let roof = Renderable::new(
        assets.add_geometry(Geometry::Cone {
            radius: 0.9,
            height: 0.5,
        }),
        assets.add_material(Material::new_standard("Roof", color_hex(0x00b3_5f45))),
    );
    scene.add_to_parent(
        Node::new("Roof").with_renderable(roof).with_transform(
            Transform::from_position(Vec3::new(0.0, 1.26, 0.0))
                .with_rotation(Quat::from_rotation_y(FRAC_PI_4)),
        ),
        group,
    )?;

    let door = Renderable::new(
        assets.add_geometry(Geometry::new_plane(0.4, 0.6)),
        assets.add_material(Material::new_standard("Door", color_hex(0x00aa_7b7b))),
    );
    scene.add_to_parent(
        Node::new("Door")
            .with_renderable(door)
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.31, 0.501))),
        group,
    )?;

    Ok(group)
}

fn rename(scene: &mut Scene, handle: NodeHandle, name: &str) {
    if let Some(node) = scene.get_node_mut(handle) {
        node.name = name.to_string();
    }
}

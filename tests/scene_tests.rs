//! Scene Graph Integration Tests
//!
//! Tests for:
//! - attach/detach/remove and the hierarchy queries
//! - Structural error rejection (cycle, duplicate parent, root, stale handles)
//! - World transform composition and the cached matrix pass
//! - Traversal order

use glam::{Affine3A, Quat, Vec3};
use grove::errors::GroveError;
use grove::scene::camera::Camera;
use grove::scene::light::Light;
use grove::scene::node::Node;
use grove::scene::transform::Transform;
use grove::scene::{NodeHandle, Scene};
use std::f32::consts::FRAC_PI_2;

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

fn affine_approx(a: Affine3A, b: Affine3A) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn node_at(name: &str, position: Vec3) -> Node {
    Node::new(name).with_transform(Transform::from_position(position))
}

/// root -> a -> b -> c
fn chain(scene: &mut Scene) -> (NodeHandle, NodeHandle, NodeHandle) {
    let a = scene.add_node(node_at("a", Vec3::X));
    let b = scene.add_to_parent(node_at("b", Vec3::Y), a).unwrap();
    let c = scene.add_to_parent(node_at("c", Vec3::Z), b).unwrap();
    (a, b, c)
}

// ============================================================================
// Creation & Attachment
// ============================================================================

#[test]
fn new_scene_has_only_root() {
    let scene = Scene::new();
    assert_eq!(scene.node_count(), 1);
    assert!(scene.is_live(scene.root()));
    assert_eq!(scene.get_node(scene.root()).unwrap().parent(), None);
}

#[test]
fn independent_scenes_share_no_global_state() {
    let a = Scene::new();
    let mut b = Scene::new();
    let root = b.root();
    b.add_to_parent(Node::new("extra"), root).unwrap();

    assert_eq!(a.node_count(), 1);
    assert_eq!(a.snapshot(), Scene::new().snapshot());
    assert_ne!(a.snapshot(), b.snapshot());
}

#[test]
fn create_node_is_detached() {
    let mut scene = Scene::new();
    let n = scene.create_node(Node::new("loose"));
    assert!(scene.contains(n));
    assert!(!scene.is_live(n));
    assert!(scene.get_node(n).unwrap().parent().is_none());
}

#[test]
fn attach_appends_child_in_order() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let first = scene.create_node(Node::new("first"));
    let second = scene.create_node(Node::new("second"));

    scene.attach(parent, first).unwrap();
    scene.attach(parent, second).unwrap();

    assert_eq!(scene.children(parent), &[first, second]);
    assert_eq!(scene.get_node(second).unwrap().parent(), Some(parent));
    assert!(scene.is_live(second));
}

#[test]
fn add_to_parent_with_stale_parent_fails() {
    let mut scene = Scene::new();
    let gone = scene.add_node(Node::new("gone"));
    scene.remove_node(gone).unwrap();
    let before = scene.node_count();

    let err = scene.add_to_parent(Node::new("x"), gone).unwrap_err();
    assert!(matches!(err, GroveError::NodeNotFound(h) if h == gone));
    assert_eq!(scene.node_count(), before);
}

// ============================================================================
// Structural Errors
// ============================================================================

#[test]
fn attach_ancestor_under_descendant_is_cycle() {
    let mut scene = Scene::new();
    let (a, _b, c) = chain(&mut scene);
    scene.detach(a).unwrap();
    let before = scene.snapshot();

    let err = scene.attach(c, a).unwrap_err();
    assert!(matches!(err, GroveError::Cycle { parent, child } if parent == c && child == a));
    assert!(err.is_structural());
    assert_eq!(scene.snapshot(), before);
}

#[test]
fn attach_to_self_is_cycle() {
    let mut scene = Scene::new();
    let n = scene.create_node(Node::new("n"));
    let before = scene.snapshot();
    assert!(matches!(scene.attach(n, n), Err(GroveError::Cycle { .. })));
    assert_eq!(scene.snapshot(), before);
}

#[test]
fn attach_already_parented_is_duplicate_parent() {
    let mut scene = Scene::new();
    let p1 = scene.add_node(Node::new("p1"));
    let p2 = scene.add_node(Node::new("p2"));
    let child = scene.add_to_parent(Node::new("child"), p1).unwrap();
    let before = scene.snapshot();

    let err = scene.attach(p2, child).unwrap_err();
    assert!(
        matches!(err, GroveError::DuplicateParent { child: c, current_parent } if c == child && current_parent == p1)
    );
    assert_eq!(scene.snapshot(), before);
    assert_eq!(scene.children(p1), &[child]);
    assert!(scene.children(p2).is_empty());
}

#[test]
fn root_cannot_be_moved_or_removed() {
    let mut scene = Scene::new();
    let n = scene.add_node(Node::new("n"));
    let root = scene.root();

    assert!(matches!(scene.attach(n, root), Err(GroveError::RootImmutable(_))));
    assert!(matches!(scene.detach(root), Err(GroveError::RootImmutable(_))));
    assert!(matches!(scene.remove_node(root), Err(GroveError::RootImmutable(_))));
    assert!(scene.is_live(root));
}

// ============================================================================
// Detach & Remove
// ============================================================================

#[test]
fn detach_keeps_subtree_intact_and_reattachable() {
    let mut scene = Scene::new();
    let (a, b, c) = chain(&mut scene);

    scene.detach(b).unwrap();
    assert!(!scene.is_live(b));
    assert!(!scene.is_live(c));
    assert!(scene.children(a).is_empty());
    assert_eq!(scene.collect_subtree(b), vec![b, c]);

    let other = scene.add_node(Node::new("other"));
    scene.attach(other, b).unwrap();
    assert!(scene.is_live(c));
    assert_eq!(scene.get_node(b).unwrap().parent(), Some(other));
}

#[test]
fn detach_orphan_is_noop() {
    let mut scene = Scene::new();
    let n = scene.create_node(Node::new("n"));
    let before = scene.snapshot();
    scene.detach(n).unwrap();
    assert_eq!(scene.snapshot(), before);
}

#[test]
fn remove_node_destroys_subtree_and_components() {
    let mut scene = Scene::new();
    let (a, b, c) = chain(&mut scene);
    let light = scene.add_light(Light::new_ambient(Vec3::ONE, 0.3), c).unwrap();
    let camera = scene
        .add_camera(Camera::new_perspective(55.0, 1.0, 0.1, 100.0), b)
        .unwrap();
    scene.active_camera = Some(camera);

    scene.remove_node(b).unwrap();

    for gone in [b, c, light, camera] {
        assert!(!scene.contains(gone));
    }
    assert!(scene.lights.get(light).is_none());
    assert!(scene.cameras.get(camera).is_none());
    assert_eq!(scene.active_camera, None);
    assert!(scene.children(a).is_empty());
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn world_is_parent_world_times_local() {
    let mut scene = Scene::new();
    let parent = scene.add_node(
        Node::new("parent").with_transform(
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
                .with_rotation(Quat::from_rotation_y(FRAC_PI_2))
                .with_scale(Vec3::splat(2.0)),
        ),
    );
    let child = scene
        .add_to_parent(node_at("child", Vec3::new(0.0, 0.0, 1.0)), parent)
        .unwrap();

    let parent_world = scene.world_transform(parent).unwrap();
    let child_local = scene.local_transform(child).unwrap();
    let child_world = scene.world_transform(child).unwrap();
    assert!(affine_approx(child_world, parent_world * child_local));

    // +Z rotated 90° about Y is +X, doubled, then offset
    assert!(vec3_approx(
        Vec3::from(child_world.translation),
        Vec3::new(3.0, 2.0, 3.0)
    ));
}

#[test]
fn world_transform_is_never_stale() {
    let mut scene = Scene::new();
    let (a, _b, c) = chain(&mut scene);
    scene.get_node_mut(a).unwrap().transform.position = Vec3::new(10.0, 0.0, 0.0);

    // No matrix pass has run since the write
    let world = scene.world_transform(c).unwrap();
    assert!(vec3_approx(
        Vec3::from(world.translation),
        Vec3::new(10.0, 1.0, 1.0)
    ));
}

#[test]
fn reattach_uses_new_parent_world() {
    let mut scene = Scene::new();
    let left = scene.add_node(node_at("left", Vec3::new(-5.0, 0.0, 0.0)));
    let right = scene.add_node(node_at("right", Vec3::new(5.0, 0.0, 0.0)));
    let child = scene.add_to_parent(node_at("child", Vec3::Y), left).unwrap();
    scene.update_matrix_world();

    scene.detach(child).unwrap();
    scene.attach(right, child).unwrap();
    scene.update_matrix_world();

    let cached = scene.get_node(child).unwrap().world_matrix();
    assert!(vec3_approx(
        Vec3::from(cached.translation),
        Vec3::new(5.0, 1.0, 0.0)
    ));
}

#[test]
fn update_matrix_world_matches_fresh_composition() {
    let mut scene = Scene::new();
    let (_a, _b, c) = chain(&mut scene);
    scene.update_matrix_world();

    let cached = *scene.get_node(c).unwrap().world_matrix();
    assert!(affine_approx(cached, scene.world_transform(c).unwrap()));
}

#[test]
fn world_transform_of_stale_handle_fails() {
    let mut scene = Scene::new();
    let n = scene.add_node(Node::new("n"));
    scene.remove_node(n).unwrap();
    assert!(matches!(scene.world_transform(n), Err(GroveError::NodeNotFound(_))));
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn traversal_is_depth_first_in_insertion_order() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("a"));
    let a1 = scene.add_to_parent(Node::new("a1"), a).unwrap();
    let a2 = scene.add_to_parent(Node::new("a2"), a).unwrap();
    let a1x = scene.add_to_parent(Node::new("a1x"), a1).unwrap();
    let b = scene.add_node(Node::new("b"));

    assert_eq!(scene.traverse(), vec![scene.root(), a, a1, a1x, a2, b]);
}

#[test]
fn detached_nodes_are_not_traversed_or_lit() {
    let mut scene = Scene::new();
    let group = scene.add_node(Node::new("group"));
    let light = scene
        .add_light(Light::new_point(Vec3::ONE, 1.0, 0.0, 2.0), group)
        .unwrap();
    scene.update_matrix_world();
    assert_eq!(scene.iter_active_lights().count(), 1);

    scene.detach(group).unwrap();
    assert!(!scene.traverse().contains(&light));
    assert_eq!(scene.iter_active_lights().count(), 0);
}

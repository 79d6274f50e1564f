//! Asset & Attachment Tests
//!
//! Tests for:
//! - Prefab validation and instantiation
//! - AssetStorage shared access
//! - AsyncAttachQueue: commit point, local transform, parent policy,
//!   failure reporting, resolution order, never-resolving loads
//! - Loaders: in-process library, manual deferred loader, tokio loader

use std::cell::RefCell;
use std::time::{Duration, Instant};

use glam::Vec3;
use grove::assets::{
    AssetLoader, AssetServer, AssetSource, LoadCompletion, Material, Prefab, PrefabLibrary,
    PrefabNode, TokioLoader,
};
use grove::errors::GroveError;
use grove::scene::transform::Transform;
use grove::scene::{AsyncAttachQueue, AttachOutcome, Node, Scene};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

/// Root lifted one unit, with two children.
fn bench_prefab() -> Prefab {
    let mut prefab = Prefab::new("Bench");
    let mut seat = PrefabNode::new("Seat");
    seat.transform = Transform::from_position(Vec3::Y);
    let seat = prefab.push(seat, None);
    prefab.push(PrefabNode::new("LegL"), Some(seat));
    prefab.push(PrefabNode::new("LegR"), Some(seat));
    prefab
}

/// Loader that hands completions back to the test instead of resolving.
#[derive(Default)]
struct DeferredLoader {
    requests: RefCell<Vec<(AssetSource, LoadCompletion)>>,
}

impl DeferredLoader {
    fn take(&self) -> Vec<(AssetSource, LoadCompletion)> {
        self.requests.take()
    }
}

impl AssetLoader for DeferredLoader {
    fn load(&self, source: &AssetSource, completion: LoadCompletion) {
        self.requests.borrow_mut().push((source.clone(), completion));
    }
}

// ============================================================================
// Prefab
// ============================================================================

#[test]
fn prefab_instantiates_detached_subtree() {
    let mut scene = Scene::new();
    let root = bench_prefab().instantiate(&mut scene).unwrap();

    assert!(!scene.is_live(root));
    assert_eq!(scene.get_node(root).unwrap().name, "Seat");
    let names: Vec<_> = scene
        .collect_subtree(root)
        .into_iter()
        .map(|h| scene.get_node(h).unwrap().name.clone())
        .collect();
    assert_eq!(names, ["Seat", "LegL", "LegR"]);
}

#[test]
fn prefab_with_several_roots_gets_a_group() {
    let mut prefab = Prefab::new("Rocks");
    prefab.push(PrefabNode::new("a"), None);
    prefab.push(PrefabNode::new("b"), None);

    let mut scene = Scene::new();
    let root = prefab.instantiate(&mut scene).unwrap();
    assert_eq!(scene.get_node(root).unwrap().name, "Rocks");
    assert_eq!(scene.children(root).len(), 2);
}

#[test]
fn prefab_with_shared_child_is_invalid() {
    let mut prefab = bench_prefab();
    prefab.nodes[0].children_indices.push(1);

    let mut scene = Scene::new();
    let before = scene.node_count();
    assert!(matches!(prefab.validate(), Err(GroveError::AssetLoad { .. })));
    assert!(prefab.instantiate(&mut scene).is_err());
    assert_eq!(scene.node_count(), before);
}

// ============================================================================
// Storage
// ============================================================================

#[test]
fn asset_server_clones_share_storage() {
    let assets = AssetServer::new();
    let shared = assets.clone();
    let handle = assets.add_material(Material::new_standard("m", Vec3::ONE).with_roughness(0.3));

    assert!(shared.materials.update(handle, |m| m.roughness = 0.8));
    assert_eq!(assets.material(handle).unwrap().roughness, 0.8);
    assert_eq!(assets.materials.len(), 1);
}

// ============================================================================
// Attach queue: commit point
// ============================================================================

#[test]
fn attachment_commits_only_at_drain() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let library = PrefabLibrary::new().with("bench", bench_prefab());
    let mut queue = AsyncAttachQueue::new();

    let before = scene.snapshot();
    let id = queue.request_attach(&library, "bench", parent, Transform::new());

    // Loaded synchronously, but nothing applied yet
    assert!(queue.is_pending(id));
    assert_eq!(scene.snapshot(), before);

    let outcomes = queue.drain(&mut scene);
    assert_eq!(outcomes.len(), 1);
    let root = outcomes[0].attached_root().unwrap();
    assert!(matches!(outcomes[0], AttachOutcome::Attached { live: true, .. }));
    assert_eq!(scene.children(parent), &[root]);
    assert!(!queue.is_pending(id));
    assert_eq!(queue.pending_count(), 0);
    assert_eq!(queue.attached_roots(), &[root]);
}

#[test]
fn removed_subtrees_are_pruned_from_attached_roots() {
    let mut scene = Scene::new();
    let parent = scene.root();
    let library = PrefabLibrary::new().with("bench", bench_prefab());
    let mut queue = AsyncAttachQueue::new();

    queue.request_attach(&library, "bench", parent, Transform::new());
    queue.request_attach(&library, "bench", parent, Transform::new());
    let outcomes = queue.drain(&mut scene);
    let first = outcomes[0].attached_root().unwrap();
    let second = outcomes[1].attached_root().unwrap();

    scene.remove_node(first).unwrap();
    assert!(queue.drain(&mut scene).is_empty());
    assert_eq!(queue.attached_roots(), &[second]);
}

#[test]
fn local_transform_is_applied_to_subtree_root() {
    let mut scene = Scene::new();
    let parent = scene.add_node(
        Node::new("parent").with_transform(Transform::from_position(Vec3::new(0.0, 0.0, -3.0))),
    );
    let library = PrefabLibrary::new().with("bench", bench_prefab());
    let mut queue = AsyncAttachQueue::new();

    queue.request_attach(
        &library,
        "bench",
        parent,
        Transform::from_position(Vec3::new(2.0, 0.0, 0.0)),
    );
    let root = queue.drain(&mut scene)[0].attached_root().unwrap();

    let world = scene.world_transform(root).unwrap();
    assert!(vec3_approx(
        Vec3::from(world.translation),
        Vec3::new(2.0, 1.0, -3.0)
    ));
}

#[test]
fn attaches_exactly_once() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let library = PrefabLibrary::new().with("bench", bench_prefab());
    let mut queue = AsyncAttachQueue::new();

    queue.request_attach(&library, "bench", parent, Transform::new());
    queue.drain(&mut scene);
    assert!(queue.drain(&mut scene).is_empty());
    assert_eq!(scene.children(parent).len(), 1);
}

// ============================================================================
// Attach queue: parent policy
// ============================================================================

#[test]
fn detached_parent_keeps_attachment_off_the_live_graph() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let loader = DeferredLoader::default();
    let mut queue = AsyncAttachQueue::new();

    queue.request_attach(&loader, "bench", parent, Transform::new());
    scene.detach(parent).unwrap();

    for (_, completion) in loader.take() {
        completion.complete(Ok(bench_prefab()));
    }
    let outcomes = queue.drain(&mut scene);

    let AttachOutcome::Attached { root, live, .. } = outcomes[0] else {
        panic!("expected attached outcome, got {:?}", outcomes[0]);
    };
    assert!(!live);
    assert!(!scene.is_live(root));
    assert!(!scene.traverse().contains(&root));
    assert_eq!(scene.get_node(root).unwrap().parent(), Some(parent));
}

#[test]
fn removed_parent_discards_result() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let loader = DeferredLoader::default();
    let mut queue = AsyncAttachQueue::new();

    queue.request_attach(&loader, "bench", parent, Transform::new());
    scene.remove_node(parent).unwrap();
    let before = scene.snapshot();

    for (_, completion) in loader.take() {
        completion.complete(Ok(bench_prefab()));
    }
    let outcomes = queue.drain(&mut scene);

    assert!(matches!(outcomes[0], AttachOutcome::ParentGone { .. }));
    assert_eq!(scene.snapshot(), before);
    assert_eq!(queue.pending_count(), 0);
}

// ============================================================================
// Attach queue: failures and ordering
// ============================================================================

#[test]
fn load_failure_is_reported_and_dropped() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let library = PrefabLibrary::new();
    let mut queue = AsyncAttachQueue::new();
    let before = scene.snapshot();

    let id = queue.request_attach(&library, "missing", parent, Transform::new());
    let outcomes = queue.drain(&mut scene);

    match &outcomes[0] {
        AttachOutcome::Failed { id: failed, source, error } => {
            assert_eq!(*failed, id);
            assert_eq!(source.uri(), "missing");
            assert!(matches!(error, GroveError::AssetLoad { .. }));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(scene.snapshot(), before);
    assert!(!queue.is_pending(id));
}

#[test]
fn siblings_commit_in_resolution_order() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let loader = DeferredLoader::default();
    let mut queue = AsyncAttachQueue::new();

    queue.request_attach(&loader, "first", parent, Transform::new());
    queue.request_attach(&loader, "second", parent, Transform::new());
    queue.request_attach(&loader, "third", parent, Transform::new());

    // Resolve in reverse request order
    for (source, completion) in loader.take().into_iter().rev() {
        let prefab = Prefab {
            name: source.uri().to_string(),
            nodes: vec![PrefabNode::new(source.uri().to_string())],
            root_indices: vec![0],
        };
        completion.complete(Ok(prefab));
    }
    queue.drain(&mut scene);

    let names: Vec<_> = scene
        .children(parent)
        .iter()
        .map(|&h| scene.get_node(h).unwrap().name.clone())
        .collect();
    assert_eq!(names, ["third", "second", "first"]);
}

#[test]
fn never_resolving_load_stays_pending() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let loader = DeferredLoader::default();
    let mut queue = AsyncAttachQueue::new();

    let id = queue.request_attach(&loader, "slow", parent, Transform::new());
    let before = scene.snapshot();
    for _ in 0..100 {
        assert!(queue.drain(&mut scene).is_empty());
    }
    assert!(queue.is_pending(id));
    assert_eq!(scene.snapshot(), before);
    assert_eq!(queue.pending().next().unwrap().source.uri(), "slow");
}

#[test]
fn completion_after_queue_dropped_reports_false() {
    let loader = DeferredLoader::default();
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    {
        let mut queue = AsyncAttachQueue::new();
        queue.request_attach(&loader, "x", parent, Transform::new());
    }
    let (_, completion) = loader.take().pop().unwrap();
    assert!(!completion.complete(Ok(bench_prefab())));
}

// ============================================================================
// Tokio loader
// ============================================================================

#[test]
fn tokio_loader_resolves_off_thread() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let prefab = bench_prefab();
    let loader = TokioLoader::new(runtime.handle().clone(), move |source: AssetSource| {
        let prefab = prefab.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if source.uri() == "bench" {
                Ok(prefab)
            } else {
                Err(GroveError::asset_load(source.uri(), "unknown"))
            }
        }
    });

    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let mut queue = AsyncAttachQueue::new();
    queue.request_attach(&loader, "bench", parent, Transform::new());
    queue.request_attach(&loader, "nope", parent, Transform::new());

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut outcomes = Vec::new();
    while outcomes.len() < 2 && Instant::now() < deadline {
        outcomes.extend(queue.drain(&mut scene));
        std::thread::sleep(Duration::from_millis(1));
    }

    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, AttachOutcome::Attached { live: true, .. }))
            .count(),
        1
    );
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, AttachOutcome::Failed { .. }))
            .count(),
        1
    );
    assert_eq!(scene.children(parent).len(), 1);
    assert_eq!(queue.pending_count(), 0);
}

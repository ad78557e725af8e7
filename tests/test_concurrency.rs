use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Barrier,
    },
    thread,
};

use multi_router::{RadixTree, RouteError};
use rand::{rngs::StdRng, Rng, SeedableRng};

const ITERS: usize = 2000;

fn workers() -> usize {
    thread::available_parallelism().map_or(4, |n| n.get()) * 2
}

fn preloaded() -> RadixTree<Arc<str>> {
    let tree = RadixTree::new();

    let base: [&[&str]; 6] = [
        &["api"],
        &["api", "v1"],
        &["api", "v1", "users"],
        &["files", "*filepath"],
        &["admin", "*path"],
        &["users", ":id"],
    ];
    for path in base {
        tree.insert(path, Arc::from("handler")).unwrap();
    }

    tree
}

#[test]
fn readers_and_writers() {
    let _ = env_logger::try_init();

    let tree = preloaded();
    let workers = workers();
    let barrier = Barrier::new(workers);

    thread::scope(|s| {
        for id in 0..workers / 2 {
            let tree = tree.clone();
            let barrier = &barrier;

            s.spawn(move || {
                let mut rng = StdRng::seed_from_u64(id as u64);
                let user = id.to_string();
                let paths: [&[&str]; 4] = [
                    &["api", "v1", "users"],
                    &["files", "docs", "readme.md"],
                    &["admin", "dashboard"],
                    &["users", &user],
                ];

                barrier.wait();

                for _ in 0..ITERS {
                    let path = paths[rng.gen_range(0..paths.len())];
                    let routes = tree.lookup(path);

                    // preloaded routes are never removed
                    assert!(!routes.is_empty(), "no match for {:?}", path);
                }
            });
        }

        for id in 0..workers - workers / 2 {
            let tree = tree.clone();
            let barrier = &barrier;

            s.spawn(move || {
                let mut rng = StdRng::seed_from_u64(1 << 16 | id as u64);

                barrier.wait();

                for _ in 0..ITERS {
                    let n = rng.gen_range(0..100).to_string();
                    let path: [&str; 3] = match rng.gen_range(0..3) {
                        0 => ["api", "dyn", &n],
                        1 => ["profile", ":user", &n],
                        _ => ["files", &n, "x"],
                    };

                    match tree.insert(&path, Arc::from("h")) {
                        Ok(_) | Err(RouteError::DuplicateRoute) => {}
                        Err(err) => panic!("unexpected insert error: {}", err),
                    }
                }
            });
        }
    });

    // 6 preloaded routes plus at most 100 distinct paths per writer pattern
    let size = tree.size();
    assert!(size > 6 && size <= 6 + 300, "unexpected size {}", size);
}

#[test]
fn racing_insert_and_remove() {
    let _ = env_logger::try_init();

    let tree = preloaded();
    let workers = workers();
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        // readers check the tree never exposes a size inconsistent with its structure
        for _ in 0..workers / 2 {
            let tree = tree.clone();
            let done = &done;

            s.spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    let routes = tree.lookup(&["churn", "7", "leaf"]);
                    assert!(routes.len() <= 1);

                    let root = tree.root();
                    let children_total = root
                        .children()
                        .iter()
                        .map(|child| child.size())
                        .sum::<usize>();

                    // sizes may move between the two reads, but never go below the preload
                    assert!(children_total >= 6);
                }
            });
        }

        let writers = (0..workers - workers / 2)
            .map(|id| {
                let tree = tree.clone();

                s.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(id as u64);
                    let mut inserted = 0usize;
                    let mut removed = 0usize;

                    for _ in 0..ITERS {
                        let n = rng.gen_range(0..16).to_string();
                        let path = ["churn", n.as_str(), "leaf"];

                        if rng.gen_bool(0.5) {
                            match tree.insert(&path, Arc::from("h")) {
                                Ok(_) => inserted += 1,
                                Err(RouteError::DuplicateRoute) => {}
                                Err(err) => panic!("unexpected insert error: {}", err),
                            }
                        } else {
                            match tree.remove(&path) {
                                Ok(()) => removed += 1,
                                Err(RouteError::RouteNotFound) | Err(RouteError::EmptyPath) => {}
                                Err(err) => panic!("unexpected remove error: {}", err),
                            }
                        }
                    }

                    (inserted, removed)
                })
            })
            .collect::<Vec<_>>();

        let (inserted, removed) = writers
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .fold((0, 0), |acc, (i, r)| (acc.0 + i, acc.1 + r));

        done.store(true, Ordering::Relaxed);

        assert_eq!(tree.size(), 6 + inserted - removed);
    });

    // drain what is left; the churn subtree must be pruned away completely
    for n in 0..16 {
        let n = n.to_string();
        let _ = tree.remove(&["churn", n.as_str(), "leaf"]);
    }

    assert_eq!(tree.size(), 6);
    assert!(tree
        .root()
        .children()
        .iter()
        .all(|child| child.path_name() != "churn"));
}

//! End-to-end runs of a thread against the mock backend: every optimistic
//! mutation is driven to its confirmed or rolled-back conclusion.

use quibble_api::{Author, Comment, CommentId, Error};
use quibble_client::{run_command, tree, Thread, ThreadMsg, ThreadOrder};
use quibble_mock_server::MockServer;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Applies one message and runs every resulting command to completion
async fn drive(t: &mut Thread, server: &MockServer, msg: ThreadMsg) {
    let mut cmds = t.update(msg);
    while let Some(cmd) = cmds.pop() {
        let outcome = run_command(server, t.post(), cmd).await;
        cmds.extend(t.update(outcome));
    }
}

fn new_thread(server: &MockServer, forest: Vec<Comment>, order: ThreadOrder) -> Thread {
    let post = server.test_add_post(forest);
    Thread::new(post, Author::stub(), order)
}

fn consistent(t: &Thread) {
    assert_eq!(t.total_count(), tree::count_all(t.comments()));
}

#[tokio::test]
async fn load_sorts_and_counts_the_whole_forest() {
    let mut rng = StdRng::seed_from_u64(1);
    let forest = tests::gen_forest(&mut rng, 5, 3);
    let seeded = tree::count_all(&forest);

    let server = MockServer::new();
    let mut t = new_thread(&server, forest, ThreadOrder::Newest);
    drive(&mut t, &server, ThreadMsg::Refresh).await;

    assert_eq!(t.total_count(), seeded);
    consistent(&t);
    for w in t.comments().windows(2) {
        assert!(w[0].created_at >= w[1].created_at);
    }
}

#[tokio::test]
async fn submitted_comment_ends_up_canonical_on_both_sides() {
    let server = MockServer::new();
    let mut t = new_thread(&server, Vec::new(), ThreadOrder::Newest);
    drive(&mut t, &server, ThreadMsg::Refresh).await;

    drive(
        &mut t,
        &server,
        ThreadMsg::SubmitComment {
            content: String::from("first!"),
        },
    )
    .await;

    assert_eq!(t.take_error(), None);
    assert_eq!(t.comments().len(), 1);
    let local = &t.comments()[0];
    let canonical = server.test_forest(t.post());
    assert_eq!(canonical.len(), 1);
    // the optimistic temp node was replaced by the server-assigned record
    assert_eq!(local, &canonical[0]);
    consistent(&t);
}

#[tokio::test]
async fn replies_nest_under_their_parent_on_both_sides() {
    let mut rng = StdRng::seed_from_u64(2);
    let forest = vec![tests::gen_comment(&mut rng, None)];
    let parent = forest[0].id;

    let server = MockServer::new();
    let mut t = new_thread(&server, forest, ThreadOrder::Newest);
    drive(&mut t, &server, ThreadMsg::Refresh).await;

    drive(
        &mut t,
        &server,
        ThreadMsg::SubmitReply {
            parent,
            content: String::from("well actually"),
        },
    )
    .await;
    assert_eq!(t.take_error(), None);

    let local = Comment::find_in(t.comments(), &parent).unwrap();
    assert_eq!(local.children.len(), 1);
    assert_eq!(local.children[0].parent_id, Some(parent));

    let canonical = server.test_forest(t.post());
    let on_server = Comment::find_in(&canonical, &parent).unwrap();
    assert_eq!(on_server.children, local.children);
    consistent(&t);
}

#[tokio::test]
async fn rejected_create_disappears_and_surfaces_the_error() {
    let mut rng = StdRng::seed_from_u64(3);
    let forest = tests::gen_forest(&mut rng, 3, 1);

    let server = MockServer::new();
    let mut t = new_thread(&server, forest, ThreadOrder::Newest);
    drive(&mut t, &server, ThreadMsg::Refresh).await;
    let before = t.comments().to_vec();

    server.test_fail_next(1);
    drive(
        &mut t,
        &server,
        ThreadMsg::SubmitComment {
            content: String::from("doomed"),
        },
    )
    .await;

    assert!(matches!(t.take_error(), Some(Error::Network(_))));
    assert_eq!(t.comments(), &before[..]);
    consistent(&t);
}

#[tokio::test]
async fn delete_cascades_through_the_subtree_on_both_sides() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut forest = tests::gen_forest(&mut rng, 2, 0);
    let target = forest[0].id;
    // two nested levels under the target
    let child = tests::gen_comment(&mut rng, Some(target));
    let grandchild = tests::gen_comment(&mut rng, Some(child.id));
    forest[0].children.push(child);
    forest[0].children[0].children.push(grandchild);

    let server = MockServer::new();
    let mut t = new_thread(&server, forest, ThreadOrder::Newest);
    drive(&mut t, &server, ThreadMsg::Refresh).await;
    assert_eq!(t.total_count(), 4);

    drive(&mut t, &server, ThreadMsg::Delete(target)).await;
    assert_eq!(t.take_error(), None);
    assert_eq!(t.total_count(), 1);
    assert!(Comment::find_in(t.comments(), &target).is_none());
    assert_eq!(tree::count_all(&server.test_forest(t.post())), 1);
    consistent(&t);
}

#[tokio::test]
async fn rejected_delete_puts_the_subtree_back() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut forest = tests::gen_forest(&mut rng, 3, 0);
    let target = forest[1].id;
    forest[1]
        .children
        .push(tests::gen_comment(&mut rng, Some(target)));

    let server = MockServer::new();
    let mut t = new_thread(&server, forest, ThreadOrder::Newest);
    drive(&mut t, &server, ThreadMsg::Refresh).await;
    let before = t.comments().to_vec();

    server.test_fail_next(1);
    drive(&mut t, &server, ThreadMsg::Delete(target)).await;

    assert!(matches!(t.take_error(), Some(Error::Network(_))));
    assert_eq!(t.comments(), &before[..]);
    // the server never saw the delete, its 4 nodes are all still there
    assert_eq!(tree::count_all(&server.test_forest(t.post())), 4);
    consistent(&t);
}

#[tokio::test]
async fn toggle_reconciles_against_canonical_counts_and_keeps_replies() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut forest = vec![tests::gen_comment(&mut rng, None)];
    forest[0].likes_count = 5;
    forest[0].dislikes_count = 1;
    forest[0].disliked_by_user = true;
    let target = forest[0].id;
    forest[0]
        .children
        .push(tests::gen_comment(&mut rng, Some(target)));

    let server = MockServer::new();
    let mut t = new_thread(&server, forest, ThreadOrder::MostLiked);
    drive(&mut t, &server, ThreadMsg::Refresh).await;

    drive(&mut t, &server, ThreadMsg::ToggleLike(target)).await;
    assert_eq!(t.take_error(), None);
    let local = Comment::find_in(t.comments(), &target).unwrap();
    assert_eq!((local.likes_count, local.dislikes_count), (6, 0));
    assert!(local.liked_by_user && !local.disliked_by_user);
    // the canonical record came back without children, ours survived
    assert_eq!(local.children.len(), 1);
    consistent(&t);
}

#[tokio::test]
async fn rejected_toggle_leaves_no_residual_drift() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut forest = vec![tests::gen_comment(&mut rng, None)];
    forest[0].likes_count = 2;
    forest[0].liked_by_user = true;
    let target = forest[0].id;

    let server = MockServer::new();
    let mut t = new_thread(&server, forest, ThreadOrder::Newest);
    drive(&mut t, &server, ThreadMsg::Refresh).await;
    let before = t.comments().to_vec();

    server.test_fail_next(1);
    drive(&mut t, &server, ThreadMsg::ToggleDislike(target)).await;

    assert!(matches!(t.take_error(), Some(Error::Network(_))));
    assert_eq!(t.comments(), &before[..]);
    consistent(&t);
}

#[tokio::test]
async fn toggling_twice_returns_to_the_initial_state() {
    let mut rng = StdRng::seed_from_u64(8);
    let forest = vec![tests::gen_comment(&mut rng, None)];
    let target = forest[0].id;

    let server = MockServer::new();
    let mut t = new_thread(&server, forest, ThreadOrder::Newest);
    drive(&mut t, &server, ThreadMsg::Refresh).await;
    let before = t.comments().to_vec();

    drive(&mut t, &server, ThreadMsg::ToggleLike(target)).await;
    drive(&mut t, &server, ThreadMsg::ToggleLike(target)).await;

    assert_eq!(t.take_error(), None);
    assert_eq!(t.comments(), &before[..]);
}

#[tokio::test]
async fn random_operations_keep_the_running_total_consistent() {
    let mut rng = StdRng::seed_from_u64(9);
    let forest = tests::gen_forest(&mut rng, 4, 2);

    let server = MockServer::new();
    let mut t = new_thread(&server, forest, ThreadOrder::Newest);
    drive(&mut t, &server, ThreadMsg::Refresh).await;
    consistent(&t);

    for step in 0..50 {
        let ids: Vec<CommentId> = collect_ids(t.comments());
        let msg = match rng.gen_range(0..6) {
            0 => ThreadMsg::SubmitComment {
                content: lipsum::lipsum_words_with_rng(&mut rng, 5),
            },
            1 if !ids.is_empty() => ThreadMsg::SubmitReply {
                parent: ids[rng.gen_range(0..ids.len())],
                content: lipsum::lipsum_words_with_rng(&mut rng, 5),
            },
            2 if !ids.is_empty() => ThreadMsg::Delete(ids[rng.gen_range(0..ids.len())]),
            3 if !ids.is_empty() => ThreadMsg::ToggleLike(ids[rng.gen_range(0..ids.len())]),
            4 if !ids.is_empty() => ThreadMsg::ToggleDislike(ids[rng.gen_range(0..ids.len())]),
            _ => ThreadMsg::SetOrder(if step % 2 == 0 {
                ThreadOrder::MostLiked
            } else {
                ThreadOrder::Newest
            }),
        };
        // fail roughly one call in four to exercise the rollback paths
        if rng.gen_range(0..4) == 0 {
            server.test_fail_next(1);
        }
        drive(&mut t, &server, msg).await;
        t.take_error();
        consistent(&t);
        assert_eq!(
            t.total_count(),
            tree::count_all(&server.test_forest(t.post())),
        );
    }
}

fn collect_ids(forest: &[Comment]) -> Vec<CommentId> {
    let mut ids = Vec::new();
    for c in forest {
        ids.push(c.id);
        ids.extend(collect_ids(&c.children));
    }
    ids
}

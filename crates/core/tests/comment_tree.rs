use threadboard_core::domain::{Comment, CommentId, NewComment, NewPost, Post, PostId};
use threadboard_core::store::{BoardRepository, BoardStore, MemoryBoardRepository, MemoryBoardStore};
use threadboard_core::tree::{delete_post_cascade, delete_subtree};
use threadboard_core::types::NonBlank;

async fn post(store: &mut MemoryBoardStore) -> Post {
    store
        .insert_post(NewPost {
            title: NonBlank::try_from("T").unwrap(),
            content: NonBlank::try_from("C").unwrap(),
            author: "alice".to_string(),
        })
        .await
        .unwrap()
}

async fn comment(
    store: &mut MemoryBoardStore,
    post_id: PostId,
    parent: Option<CommentId>,
) -> Comment {
    store
        .insert_comment(NewComment {
            post_id,
            parent_id: parent,
            content: NonBlank::try_from("text").unwrap(),
            author: "bob".to_string(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn subtree_is_removed_post_order_with_ascending_branches() {
    let repo = MemoryBoardRepository::new();
    let mut store = repo.begin().await.unwrap();
    let p = post(&mut store).await;
    let root = comment(&mut store, p.id, None).await;
    let a = comment(&mut store, p.id, Some(root.id)).await;
    let b = comment(&mut store, p.id, Some(root.id)).await;
    let a1 = comment(&mut store, p.id, Some(a.id)).await;
    let b1 = comment(&mut store, p.id, Some(b.id)).await;
    let a2 = comment(&mut store, p.id, Some(a.id)).await;
    let a1x = comment(&mut store, p.id, Some(a1.id)).await;

    let removed = delete_subtree(&mut store, root.id).await.unwrap();
    assert_eq!(removed, vec![a1x.id, a1.id, a2.id, a.id, b1.id, b.id]);
    assert!(store.find_comment(root.id).await.unwrap().is_some());
    assert!(store.find_replies(root.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn leaf_subtree_is_empty() {
    let repo = MemoryBoardRepository::new();
    let mut store = repo.begin().await.unwrap();
    let p = post(&mut store).await;
    let leaf = comment(&mut store, p.id, None).await;

    let removed = delete_subtree(&mut store, leaf.id).await.unwrap();
    assert!(removed.is_empty());
}

#[tokio::test]
async fn post_cascade_only_touches_its_own_forest() {
    let repo = MemoryBoardRepository::new();
    let mut store = repo.begin().await.unwrap();
    let p = post(&mut store).await;
    let q = post(&mut store).await;
    let c1 = comment(&mut store, p.id, None).await;
    let other = comment(&mut store, q.id, None).await;
    let c2 = comment(&mut store, p.id, None).await;
    let r1 = comment(&mut store, p.id, Some(c1.id)).await;
    let r2 = comment(&mut store, p.id, Some(c2.id)).await;

    let removed = delete_post_cascade(&mut store, p.id).await.unwrap();
    assert_eq!(removed, vec![r1.id, c1.id, r2.id, c2.id]);

    store.delete_post(p.id).await.unwrap();
    assert!(store.find_comment(other.id).await.unwrap().is_some());
    assert!(store.post_exists(q.id).await.unwrap());
}

#[tokio::test]
async fn deep_reply_chain_does_not_exhaust_the_stack() {
    const DEPTH: usize = 2_000;

    let repo = MemoryBoardRepository::new();
    let mut store = repo.begin().await.unwrap();
    let p = post(&mut store).await;
    let root = comment(&mut store, p.id, None).await;
    let mut parent = root.id;
    for _ in 0..DEPTH {
        parent = comment(&mut store, p.id, Some(parent)).await.id;
    }

    let removed = delete_subtree(&mut store, root.id).await.unwrap();
    assert_eq!(removed.len(), DEPTH);
    assert_eq!(removed.first().copied(), Some(parent));
    store.delete_comment(root.id).await.unwrap();
    assert!(store.find_top_level_comments(p.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn uncommitted_cascade_leaves_store_untouched() {
    let repo = MemoryBoardRepository::new();
    let (post_id, root_id, reply_id) = {
        let mut store = repo.begin().await.unwrap();
        let p = post(&mut store).await;
        let root = comment(&mut store, p.id, None).await;
        let reply = comment(&mut store, p.id, Some(root.id)).await;
        store.commit().await.unwrap();
        (p.id, root.id, reply.id)
    };

    {
        let mut store = repo.begin().await.unwrap();
        delete_post_cascade(&mut store, post_id).await.unwrap();
        // dropped before commit, as when a later step fails
    }

    let mut store = repo.begin().await.unwrap();
    assert!(store.post_exists(post_id).await.unwrap());
    assert!(store.find_comment(root_id).await.unwrap().is_some());
    assert!(store.find_comment(reply_id).await.unwrap().is_some());
}

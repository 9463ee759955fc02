//! Entity lifecycle, lookups, relations and cascading delete.

use blog_model::{
    Comment, CommentFilter, Direction, Entity, Post, PostFilter, PostOrder, User, UserFilter,
    UserOrder,
};
use blog_store::DbError;
use ntest::timeout;

use super::helpers::setup;

fn saved_user(blog: &blog_model::Blog, email: &str, fullname: &str) -> User {
    let mut user = User::new(email, "secret", fullname);
    user.save(blog).unwrap();
    user
}

#[timeout(1000)]
#[test]
fn test_create_and_retrieve_user() {
    let blog = setup();
    saved_user(&blog, "bob@gmail.com", "Bob");

    let bob = User::find(&blog, UserFilter::ByEmail("bob@gmail.com".to_string()))
        .first()
        .unwrap();

    let bob = bob.unwrap();
    assert_eq!(bob.fullname, "Bob");
    assert!(!bob.is_admin);
}

#[timeout(1000)]
#[test]
fn test_missing_user_is_none() {
    let blog = setup();

    let nobody = User::find(&blog, UserFilter::ByEmail("bob@gmail.com".to_string()))
        .first()
        .unwrap();
    assert!(nobody.is_none());
    assert!(User::find_by_id(&blog, 1).unwrap().is_none());
}

#[timeout(1000)]
#[test]
fn test_try_connect_as_user() {
    let blog = setup();
    saved_user(&blog, "bob@gmail.com", "Bob");

    assert!(User::connect(&blog, "bob@gmail.com", "secret").unwrap().is_some());
    assert!(User::connect(&blog, "bob@gmail.com", "badpassword").unwrap().is_none());
    assert!(User::connect(&blog, "tom@gmail.com", "secret").unwrap().is_none());
}

#[timeout(1000)]
#[test]
fn test_create_post() {
    let blog = setup();
    let bob = saved_user(&blog, "bob@gmail.com", "Bob");

    Post::new(&bob, "My first post", "Hello World").save(&blog).unwrap();

    assert_eq!(Post::count(&blog).unwrap(), 1);

    let bob_posts = Post::find(&blog, PostFilter::by_author(&bob)).fetch().unwrap();
    assert_eq!(bob_posts.len(), 1);
    let first_post = &bob_posts[0];
    assert_eq!(first_post.author_id, bob.id);
    assert_eq!(first_post.title, "My first post");
    assert_eq!(first_post.content, "Hello World");
    assert!(first_post.posted_at.is_some());
}

#[timeout(1000)]
#[test]
fn test_post_comments() {
    let blog = setup();
    let bob = saved_user(&blog, "bob@gmail.com", "Bob");
    let mut bob_post = Post::new(&bob, "My first post", "Hello World");
    bob_post.save(&blog).unwrap();

    Comment::new(&bob_post, "Jeff", "Nice post").save(&blog).unwrap();
    Comment::new(&bob_post, "Tom", "I knew that !").save(&blog).unwrap();

    let bob_post_comments = Comment::find(&blog, CommentFilter::by_post(&bob_post))
        .fetch()
        .unwrap();

    assert_eq!(bob_post_comments.len(), 2);

    let first_comment = &bob_post_comments[0];
    assert_eq!(first_comment.author, "Jeff");
    assert_eq!(first_comment.content, "Nice post");
    assert!(first_comment.posted_at.is_some());

    let second_comment = &bob_post_comments[1];
    assert_eq!(second_comment.author, "Tom");
    assert_eq!(second_comment.content, "I knew that !");
    assert!(second_comment.posted_at.is_some());
}

#[timeout(1000)]
#[test]
fn test_use_the_comments_relation() {
    let blog = setup();
    let bob = saved_user(&blog, "bob@gmail.com", "Bob");
    let mut bob_post = Post::new(&bob, "My first post", "Hello World");
    bob_post.save(&blog).unwrap();

    bob_post.add_comment(&blog, "Jeff", "Nice post").unwrap();
    bob_post.add_comment(&blog, "Tom", "I knew that !").unwrap();

    assert_eq!(User::count(&blog).unwrap(), 1);
    assert_eq!(Post::count(&blog).unwrap(), 1);
    assert_eq!(Comment::count(&blog).unwrap(), 2);

    let bob_post = Post::find(&blog, PostFilter::by_author(&bob))
        .first()
        .unwrap()
        .unwrap();
    let comments = bob_post.comments(&blog).unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].author, "Jeff");
    assert_eq!(comments[1].author, "Tom");

    bob_post.delete(&blog).unwrap();

    assert_eq!(User::count(&blog).unwrap(), 1);
    assert_eq!(Post::count(&blog).unwrap(), 0);
    assert_eq!(Comment::count(&blog).unwrap(), 0);
}

#[timeout(1000)]
#[test]
fn test_delete_leaves_other_posts_alone() {
    let blog = setup();
    let bob = saved_user(&blog, "bob@gmail.com", "Bob");
    let mut first = Post::new(&bob, "First", "One");
    first.save(&blog).unwrap();
    let mut second = Post::new(&bob, "Second", "Two");
    second.save(&blog).unwrap();
    first.add_comment(&blog, "Jeff", "a").unwrap();
    second.add_comment(&blog, "Tom", "b").unwrap();
    second.add_comment(&blog, "Mike", "c").unwrap();

    second.delete(&blog).unwrap();

    assert_eq!(Post::count(&blog).unwrap(), 1);
    assert_eq!(Comment::count(&blog).unwrap(), 1);
    assert_eq!(first.comments(&blog).unwrap().len(), 1);
}

#[timeout(1000)]
#[test]
fn test_delete_user_cascades_to_posts_and_comments() {
    let blog = setup();
    let bob = saved_user(&blog, "bob@gmail.com", "Bob");
    let jeff = saved_user(&blog, "jeff@gmail.com", "Jeff");
    let mut bob_post = Post::new(&bob, "Bob's", "post");
    bob_post.save(&blog).unwrap();
    let mut jeff_post = Post::new(&jeff, "Jeff's", "post");
    jeff_post.save(&blog).unwrap();
    bob_post.add_comment(&blog, "Tom", "hi").unwrap();
    jeff_post.add_comment(&blog, "Tom", "hello").unwrap();

    bob.delete(&blog).unwrap();

    assert_eq!(User::count(&blog).unwrap(), 1);
    assert_eq!(Post::count(&blog).unwrap(), 1);
    assert_eq!(Comment::count(&blog).unwrap(), 1);
    assert_eq!(jeff.posts(&blog).unwrap(), vec![jeff_post]);
}

#[timeout(1000)]
#[test]
fn test_delete_unsaved_entity() {
    let blog = setup();
    let ghost = User::new("ghost@gmail.com", "secret", "Ghost");

    assert!(matches!(
        ghost.delete(&blog),
        Err(DbError::RecordNotFound { id: 0, .. })
    ));
}

#[timeout(1000)]
#[test]
fn test_duplicate_email_is_rejected() {
    let blog = setup();
    saved_user(&blog, "bob@gmail.com", "Bob");

    let mut impostor = User::new("bob@gmail.com", "other", "Not Bob");
    let result = impostor.save(&blog);

    assert!(matches!(
        result,
        Err(DbError::UniqueViolation { ref field, .. }) if field == "email"
    ));
    assert!(impostor.id.is_none());
    assert_eq!(User::count(&blog).unwrap(), 1);
}

#[timeout(1000)]
#[test]
fn test_save_updates_persisted_entity() {
    let blog = setup();
    let mut bob = saved_user(&blog, "bob@gmail.com", "Bob");
    let jeff = saved_user(&blog, "jeff@gmail.com", "Jeff");

    bob.fullname = "Robert".to_string();
    bob.save(&blog).unwrap();

    assert_eq!(User::count(&blog).unwrap(), 2);
    let reloaded = User::find_by_id(&blog, bob.id.unwrap()).unwrap().unwrap();
    assert_eq!(reloaded.fullname, "Robert");

    let mut clash = jeff.clone();
    clash.email = "bob@gmail.com".to_string();
    assert!(matches!(
        clash.save(&blog),
        Err(DbError::UniqueViolation { .. })
    ));
    assert_eq!(User::find_by_id(&blog, jeff.id.unwrap()).unwrap(), Some(jeff));
}

#[timeout(1000)]
#[test]
fn test_post_requires_saved_author() {
    let blog = setup();
    let unsaved = User::new("bob@gmail.com", "secret", "Bob");

    let result = Post::new(&unsaved, "Orphan", "No author").save(&blog);
    assert!(matches!(
        result,
        Err(DbError::IntegrityViolation { ref field, .. }) if field == "author_id"
    ));
    assert_eq!(Post::count(&blog).unwrap(), 0);
}

#[timeout(1000)]
#[test]
fn test_posted_at_is_kept_when_set() {
    let blog = setup();
    let bob = saved_user(&blog, "bob@gmail.com", "Bob");
    let at = chrono::DateTime::parse_from_rfc3339("2009-06-14T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);

    let mut post = Post::new(&bob, "Old", "news").with_posted_at(at);
    post.save(&blog).unwrap();

    let reloaded = Post::find_by_id(&blog, post.id.unwrap()).unwrap().unwrap();
    assert_eq!(reloaded.posted_at, Some(at));
}

#[timeout(1000)]
#[test]
fn test_most_recent_post_first() {
    let blog = setup();
    let bob = saved_user(&blog, "bob@gmail.com", "Bob");
    for title in ["one", "two", "three"] {
        Post::new(&bob, title, "body").save(&blog).unwrap();
    }

    let latest = Post::all(&blog)
        .order_by(PostOrder::PostedAt, Direction::Desc)
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(latest.title, "three");
}

#[timeout(1000)]
#[test]
fn test_failed_save_does_not_stamp_post() {
    let blog = setup();
    let bob = saved_user(&blog, "bob@gmail.com", "Bob");

    let mut draft = Post::new(&bob, "Draft", "first try");
    draft.author_id = Some(99);
    assert!(matches!(
        draft.save(&blog),
        Err(DbError::IntegrityViolation { .. })
    ));
    assert_eq!(draft.id, None);
    assert_eq!(draft.posted_at, None);

    Post::new(&bob, "Between", "body").save(&blog).unwrap();
    draft.author_id = bob.id;
    draft.save(&blog).unwrap();

    let latest = Post::all(&blog)
        .order_by(PostOrder::PostedAt, Direction::Desc)
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(latest.title, "Draft");
    assert_eq!(latest.id, draft.id);
    assert_eq!(latest.posted_at, draft.posted_at);
}

#[timeout(1000)]
#[test]
fn test_first_honors_existing_limit() {
    let blog = setup();
    let bob = saved_user(&blog, "bob@gmail.com", "Bob");
    for title in ["one", "two", "three"] {
        Post::new(&bob, title, "body").save(&blog).unwrap();
    }

    let empty = Post::all(&blog).limit(0);
    assert!(empty.fetch().unwrap().is_empty());
    assert!(empty.first().unwrap().is_none());

    let paged = Post::all(&blog)
        .order_by(PostOrder::Id, Direction::Asc)
        .offset(1)
        .limit(5);
    assert_eq!(paged.first().unwrap().unwrap().title, "two");
}

#[timeout(1000)]
#[test]
fn test_order_ties_keep_insertion_order() {
    let blog = setup();
    saved_user(&blog, "c@gmail.com", "Same");
    saved_user(&blog, "a@gmail.com", "Other");
    saved_user(&blog, "b@gmail.com", "Same");

    let emails: Vec<String> = User::all(&blog)
        .order_by(UserOrder::Fullname, Direction::Desc)
        .fetch()
        .unwrap()
        .into_iter()
        .map(|u| u.email)
        .collect();
    assert_eq!(emails, vec!["c@gmail.com", "b@gmail.com", "a@gmail.com"]);

    let emails: Vec<String> = User::all(&blog)
        .order_by(UserOrder::Email, Direction::Asc)
        .offset(1)
        .limit(1)
        .fetch()
        .unwrap()
        .into_iter()
        .map(|u| u.email)
        .collect();
    assert_eq!(emails, vec!["b@gmail.com"]);
}

#[timeout(1000)]
#[test]
fn test_query_handle_is_restartable() {
    let blog = setup();
    let bob = saved_user(&blog, "bob@gmail.com", "Bob");
    let query = Post::find(&blog, PostFilter::ByAuthorEmail("bob@gmail.com".to_string()));

    assert_eq!(query.count().unwrap(), 0);
    Post::new(&bob, "Hello", "World").save(&blog).unwrap();
    assert_eq!(query.count().unwrap(), 1);
    assert_eq!(query.fetch().unwrap().len(), 1);
}

#[timeout(1000)]
#[test]
fn test_insert_all_is_atomic() {
    let blog = setup();
    let mut users = vec![
        User::new("bob@gmail.com", "secret", "Bob"),
        User::new("jeff@gmail.com", "secret", "Jeff"),
        User::new("bob@gmail.com", "secret", "Bob again"),
    ];

    assert!(User::insert_all(&blog, &mut users).is_err());
    assert_eq!(User::count(&blog).unwrap(), 0);
    assert!(users.iter().all(|u| u.id.is_none()));

    users.pop();
    User::insert_all(&blog, &mut users).unwrap();
    assert_eq!(User::count(&blog).unwrap(), 2);
    assert_eq!(users[0].id, Some(1));
    assert_eq!(users[1].id, Some(2));

    let mut posts = vec![
        Post::new(&users[0], "A", "a"),
        Post::new(&users[1], "B", "b"),
    ];
    Post::insert_all(&blog, &mut posts).unwrap();
    let mut comments = vec![Comment::new(&posts[1], "Tom", "first")];
    Comment::insert_all(&blog, &mut comments).unwrap();

    assert_eq!(posts[1].comments(&blog).unwrap(), comments);
}

#[timeout(1000)]
#[test]
fn test_failed_insert_all_keeps_entities_unchanged() {
    let blog = setup();
    let bob = saved_user(&blog, "bob@gmail.com", "Bob");

    let mut posts = vec![
        Post::new(&bob, "Kept", "a"),
        Post::new(&bob, "Dangling", "b"),
    ];
    posts[1].author_id = Some(99);
    assert!(matches!(
        Post::insert_all(&blog, &mut posts),
        Err(DbError::IntegrityViolation { .. })
    ));
    assert_eq!(Post::count(&blog).unwrap(), 0);
    assert!(posts.iter().all(|p| p.id.is_none() && p.posted_at.is_none()));

    Post::new(&bob, "Between", "c").save(&blog).unwrap();
    posts[1].author_id = bob.id;
    Post::insert_all(&blog, &mut posts).unwrap();

    let latest = Post::all(&blog)
        .order_by(PostOrder::PostedAt, Direction::Desc)
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(latest.title, "Dangling");
    assert!(posts.iter().all(|p| p.posted_at.is_some()));
}

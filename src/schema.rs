table! {
    users (id) {
        id -> Int8,
        name -> Varchar,
        username -> Varchar,
        email -> Varchar,
        password -> Varchar,
        role -> Varchar,
        created_at -> Timestamp,
        updated_at -> Timestamp,
        deleted_at -> Nullable<Timestamp>,
    }
}

table! {
    blogs (id) {
        id -> Int8,
        user_id -> Int8,
        title -> Varchar,
        body -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
        deleted_at -> Nullable<Timestamp>,
    }
}

table! {
    comments (id) {
        id -> Int8,
        user_id -> Int8,
        blog_id -> Int8,
        body -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
        deleted_at -> Nullable<Timestamp>,
    }
}

table! {
    blog_likes (id) {
        id -> Int8,
        user_id -> Int8,
        blog_id -> Int8,
        created_at -> Timestamp,
        updated_at -> Timestamp,
        deleted_at -> Nullable<Timestamp>,
    }
}

table! {
    comment_likes (id) {
        id -> Int8,
        user_id -> Int8,
        comment_id -> Int8,
        created_at -> Timestamp,
        updated_at -> Timestamp,
        deleted_at -> Nullable<Timestamp>,
    }
}

joinable!(blogs -> users (user_id));
joinable!(comments -> users (user_id));
joinable!(comments -> blogs (blog_id));
joinable!(blog_likes -> users (user_id));
joinable!(blog_likes -> blogs (blog_id));
joinable!(comment_likes -> users (user_id));
joinable!(comment_likes -> comments (comment_id));

allow_tables_to_appear_in_same_query!(
    users,
    blogs,
    comments,
    blog_likes,
    comment_likes,
);

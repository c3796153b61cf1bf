diesel::table! {
    blogs (id) {
        id -> Varchar,
        title -> Varchar,
        content -> Text,
        tags -> Array<Text>,
        author_id -> Varchar,
        likes -> Int4,
        views -> Int4,
        featured -> Bool,
        privacy -> Varchar,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    likes (user_id, blog_id) {
        user_id -> Varchar,
        blog_id -> Varchar,
    }
}

diesel::table! {
    users (id) {
        id -> Varchar,
        username -> Varchar,
        name -> Varchar,
        avatar -> Nullable<Varchar>,
        pass -> Varchar,
    }
}

diesel::joinable!(blogs -> users (author_id));
diesel::joinable!(likes -> blogs (blog_id));

diesel::allow_tables_to_appear_in_same_query!(blogs, likes, users);

table! {
    favorites (user, micropost) {
        user -> Integer,
        micropost -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    follows (follower, followed) {
        follower -> Integer,
        followed -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    microposts (id) {
        id -> Integer,
        user_id -> Integer,
        content -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    users (id) {
        id -> Integer,
        name -> Text,
        email -> Text,
        hash -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

joinable!(microposts -> users (user_id));
joinable!(favorites -> microposts (micropost));
joinable!(favorites -> users (user));

allow_tables_to_appear_in_same_query!(favorites, follows, microposts, users,);

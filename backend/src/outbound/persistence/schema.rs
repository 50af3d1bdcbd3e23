//! Diesel table definitions mirroring `migrations/`.

diesel::table! {
    skills (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    ministries (id) {
        id -> Integer,
        name -> Text,
        abbreviation -> Text,
    }
}

diesel::table! {
    label_categories (id) {
        id -> Integer,
        name -> Text,
        color -> Text,
    }
}

diesel::table! {
    labels (id) {
        id -> Integer,
        name -> Text,
        category_id -> Integer,
    }
}

diesel::table! {
    organizations (id) {
        id -> Integer,
        name -> Text,
        abbreviation -> Text,
        organization_type -> Text,
        parent_id -> Nullable<Integer>,
        is_active -> Bool,
        tooi_identifier -> Nullable<Text>,
        oin_number -> Nullable<Text>,
        previous_names -> Text,
        successor_id -> Nullable<Integer>,
        source_url -> Nullable<Text>,
    }
}

diesel::table! {
    users (id) {
        id -> Integer,
        email -> Text,
        first_name -> Text,
        last_name -> Text,
        is_superuser -> Bool,
    }
}

diesel::table! {
    user_roles (user_id, role) {
        user_id -> Integer,
        role -> Text,
    }
}

diesel::table! {
    user_labels (user_id, label_id) {
        user_id -> Integer,
        label_id -> Integer,
    }
}

diesel::table! {
    colleagues (id) {
        id -> Integer,
        user_id -> Nullable<Integer>,
        name -> Text,
        email -> Text,
        source -> Text,
        source_id -> Text,
        source_url -> Text,
    }
}

diesel::table! {
    colleague_skills (colleague_id, skill_id) {
        colleague_id -> Integer,
        skill_id -> Integer,
    }
}

diesel::table! {
    colleague_labels (colleague_id, label_id) {
        colleague_id -> Integer,
        label_id -> Integer,
    }
}

diesel::table! {
    assignments (id) {
        id -> Integer,
        name -> Text,
        start_date -> Nullable<Date>,
        end_date -> Nullable<Date>,
        status -> Text,
        ministry_id -> Nullable<Integer>,
        owner_id -> Nullable<Integer>,
        extra_info -> Text,
        source -> Text,
        source_id -> Text,
        source_url -> Text,
    }
}

diesel::table! {
    assignment_organizations (id) {
        id -> Integer,
        assignment_id -> Integer,
        organization_id -> Integer,
        role -> Text,
        effective_from -> Nullable<Date>,
        effective_until -> Nullable<Date>,
    }
}

diesel::table! {
    services (id) {
        id -> Integer,
        assignment_id -> Integer,
        description -> Text,
        skill_id -> Nullable<Integer>,
        cost_type -> Text,
        fixed_cost -> Nullable<Integer>,
        hours_per_week -> Nullable<Integer>,
        period_source -> Text,
        specific_start_date -> Nullable<Date>,
        specific_end_date -> Nullable<Date>,
        source -> Text,
        source_id -> Text,
        source_url -> Text,
    }
}

diesel::table! {
    placements (id) {
        id -> Integer,
        colleague_id -> Integer,
        service_id -> Integer,
        hours_per_week -> Nullable<Integer>,
        period_source -> Text,
        specific_start_date -> Nullable<Date>,
        specific_end_date -> Nullable<Date>,
        source -> Text,
        source_id -> Text,
        source_url -> Text,
    }
}

diesel::table! {
    config (key) {
        key -> Text,
        value -> Text,
    }
}

diesel::table! {
    events (id) {
        id -> Integer,
        timestamp -> Timestamp,
        user_email -> Text,
        name -> Text,
        context -> Text,
    }
}

diesel::joinable!(labels -> label_categories (category_id));
diesel::joinable!(user_roles -> users (user_id));
diesel::joinable!(user_labels -> users (user_id));
diesel::joinable!(user_labels -> labels (label_id));
diesel::joinable!(colleagues -> users (user_id));
diesel::joinable!(colleague_skills -> colleagues (colleague_id));
diesel::joinable!(colleague_skills -> skills (skill_id));
diesel::joinable!(colleague_labels -> colleagues (colleague_id));
diesel::joinable!(colleague_labels -> labels (label_id));
diesel::joinable!(assignments -> ministries (ministry_id));
diesel::joinable!(assignments -> colleagues (owner_id));
diesel::joinable!(assignment_organizations -> assignments (assignment_id));
diesel::joinable!(assignment_organizations -> organizations (organization_id));
diesel::joinable!(services -> assignments (assignment_id));
diesel::joinable!(services -> skills (skill_id));
diesel::joinable!(placements -> colleagues (colleague_id));
diesel::joinable!(placements -> services (service_id));

diesel::allow_tables_to_appear_in_same_query!(
    skills,
    ministries,
    label_categories,
    labels,
    organizations,
    users,
    user_roles,
    user_labels,
    colleagues,
    colleague_skills,
    colleague_labels,
    assignments,
    assignment_organizations,
    services,
    placements,
    config,
    events,
);

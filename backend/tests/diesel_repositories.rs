//! Diesel adapters against a migrated SQLite file.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rstest::rstest;

use wies::domain::ports::{
    AssignmentRepository, CatalogueRepository, ColleagueRepository, ImportRepository,
    LabelRepository, LabelRepositoryError, OrganizationRepository, UserRepository,
    UserRepositoryError,
};
use wies::domain::{
    AllowedEmailDomains, AssignmentDraft, AssignmentStatus, ColleagueDraft, ColleagueId,
    OrganizationDraft, OrganizationType, Placement, PlacementDraft, PreviousName, Role, Service,
    ServiceDraft, SkillId, UserDraft, UserImportPlan,
};
use wies::outbound::persistence::{
    DieselAssignmentRepository, DieselCatalogueRepository, DieselColleagueRepository,
    DieselImportRepository, DieselLabelRepository, DieselOrganizationRepository,
    DieselUserRepository,
};
use wies::test_support::TestDatabase;

fn user_draft(email: &str) -> UserDraft {
    UserDraft {
        first_name: "Jan".to_owned(),
        last_name: "Jansen".to_owned(),
        email: email.to_owned(),
        label_ids: BTreeSet::new(),
        roles: BTreeSet::from([Role::Consultant]),
    }
}

fn colleague_draft(email: &str) -> ColleagueDraft {
    ColleagueDraft {
        name: "Jan Jansen".to_owned(),
        email: email.to_owned(),
        skill_ids: BTreeSet::new(),
        label_ids: BTreeSet::new(),
    }
}

#[rstest]
#[case("jan@rijksoverheid.nl")]
#[case("JAN@RijksOverheid.nl")]
#[actix_rt::test]
async fn users_are_found_by_email_regardless_of_case(#[case] lookup: &str) {
    let db = TestDatabase::new().await.expect("test database");
    let repo = DieselUserRepository::new(db.pool());
    let created = repo
        .create(&user_draft("jan@rijksoverheid.nl"), false)
        .await
        .expect("create user");

    let found = repo.find_by_email(lookup).await.expect("lookup");

    assert_eq!(found.map(|user| user.id), Some(created.id));
}

#[actix_rt::test]
async fn duplicate_email_is_a_conflict() {
    let db = TestDatabase::new().await.expect("test database");
    let repo = DieselUserRepository::new(db.pool());
    repo.create(&user_draft("jan@rijksoverheid.nl"), false)
        .await
        .expect("first user");

    let err = repo
        .create(&user_draft("Jan@rijksoverheid.nl"), false)
        .await
        .expect_err("second user with the same address");

    assert!(
        matches!(err, UserRepositoryError::Conflict { .. }),
        "unexpected error: {err}"
    );
}

#[actix_rt::test]
async fn new_user_claims_the_colleague_with_their_email() {
    let db = TestDatabase::new().await.expect("test database");
    let colleagues = DieselColleagueRepository::new(db.pool());
    let colleague = colleagues
        .create(&colleague_draft("anna@rijksoverheid.nl"))
        .await
        .expect("create colleague");
    assert_eq!(colleague.user_id, None);

    let user = DieselUserRepository::new(db.pool())
        .create(&user_draft("anna@rijksoverheid.nl"), false)
        .await
        .expect("create user");

    assert_eq!(user.colleague_id, Some(colleague.id));
    let reloaded = colleagues
        .find(colleague.id)
        .await
        .expect("find colleague")
        .expect("colleague exists");
    assert_eq!(reloaded.user_id, Some(user.id));
}

#[actix_rt::test]
async fn new_colleague_links_to_an_existing_user() {
    let db = TestDatabase::new().await.expect("test database");
    let user = DieselUserRepository::new(db.pool())
        .create(&user_draft("piet@rijksoverheid.nl"), false)
        .await
        .expect("create user");

    let colleague = DieselColleagueRepository::new(db.pool())
        .create(&colleague_draft("Piet@Rijksoverheid.nl"))
        .await
        .expect("create colleague");

    assert_eq!(colleague.user_id, Some(user.id));
}

#[actix_rt::test]
async fn label_names_are_unique_within_a_category() {
    let db = TestDatabase::new().await.expect("test database");
    let repo = DieselLabelRepository::new(db.pool());
    let category = repo
        .create_category("Merk", "#DBEAFE")
        .await
        .expect("create category");
    repo.create_label(category.id, "Rijks ICT Gilde")
        .await
        .expect("first label");

    let err = repo
        .create_label(category.id, "Rijks ICT Gilde")
        .await
        .expect_err("duplicate label");
    assert!(
        matches!(err, LabelRepositoryError::Conflict { .. }),
        "unexpected error: {err}"
    );

    let (existing, created) = repo
        .ensure_label(category.id, "Rijks ICT Gilde")
        .await
        .expect("ensure label");
    assert!(!created);
    assert_eq!(existing.name, "Rijks ICT Gilde");
}

#[actix_rt::test]
async fn deleting_a_category_removes_its_labels() {
    let db = TestDatabase::new().await.expect("test database");
    let repo = DieselLabelRepository::new(db.pool());
    let category = repo
        .create_category("Expertise", "#FEF3C7")
        .await
        .expect("create category");
    repo.create_label(category.id, "AI").await.expect("label");

    assert!(repo.delete_category(category.id).await.expect("delete"));

    assert!(repo.list_labels().await.expect("labels").is_empty());
}

#[actix_rt::test]
async fn organisation_rename_history_is_stored() {
    let db = TestDatabase::new().await.expect("test database");
    let repo = DieselOrganizationRepository::new(db.pool());
    let mut organization = repo
        .create(&OrganizationDraft {
            name: "Ministerie van Algemene Zaken".to_owned(),
            abbreviation: "AZ".to_owned(),
            organization_type: OrganizationType::Ministerie,
            parent_id: None,
            tooi_identifier: None,
            oin_number: None,
            source_url: None,
        })
        .await
        .expect("create organisation");

    let until = NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date");
    organization.previous_names.push(PreviousName {
        name: organization.name.clone(),
        until,
    });
    organization.name = "Ministerie van Algemene Zaken en Digitalisering".to_owned();
    repo.save(&organization).await.expect("save");

    let stored = repo
        .list_all()
        .await
        .expect("list")
        .into_iter()
        .find(|candidate| candidate.id == organization.id)
        .expect("organisation stored");
    assert_eq!(stored.name, "Ministerie van Algemene Zaken en Digitalisering");
    assert_eq!(
        stored.previous_names,
        vec![PreviousName {
            name: "Ministerie van Algemene Zaken".to_owned(),
            until,
        }]
    );
}

#[actix_rt::test]
async fn user_import_skips_known_addresses() {
    let db = TestDatabase::new().await.expect("test database");
    let repo = DieselImportRepository::new(db.pool());
    let csv = "first_name,last_name,email,brand,Consultant\n\
               Anna,de Vries,anna@rijksoverheid.nl,Rijks ICT Gilde,y\n\
               Piet,Bakker,piet@rijksoverheid.nl,,n\n";
    let plan = UserImportPlan::parse(csv, &AllowedEmailDomains::default()).expect("valid csv");

    let first = repo.import_users(&plan).await.expect("first import");
    assert_eq!(first.users_created, 2);
    assert_eq!(first.created_labels, vec!["Rijks ICT Gilde".to_owned()]);

    let second = repo.import_users(&plan).await.expect("second import");
    assert_eq!(second.users_created, 0);
    assert_eq!(second.labels_created, 0);

    let anna = DieselUserRepository::new(db.pool())
        .find_by_email("anna@rijksoverheid.nl")
        .await
        .expect("lookup")
        .expect("imported user");
    assert!(anna.roles.contains(&Role::Consultant));
    assert_eq!(anna.label_ids.len(), 1);
}

/// Filled assignment owned by `owner` with one service staffed by `owner`.
async fn staffed_assignment(
    repo: &DieselAssignmentRepository,
    owner: ColleagueId,
    skill_id: Option<SkillId>,
) -> (Service, Placement) {
    let assignment_id = repo
        .create(&AssignmentDraft {
            name: "Datateam".to_owned(),
            status: AssignmentStatus::Ingevuld,
            owner_id: Some(owner),
            ..AssignmentDraft::default()
        })
        .await
        .expect("create assignment");
    let service = repo
        .create_service(
            assignment_id,
            &ServiceDraft {
                description: "Data engineer".to_owned(),
                skill_id,
                ..ServiceDraft::default()
            },
        )
        .await
        .expect("create service");
    let placement = repo
        .create_placement(&PlacementDraft {
            colleague_id: owner,
            service_id: service.id,
            ..PlacementDraft::default()
        })
        .await
        .expect("create placement");
    (service, placement)
}

#[actix_rt::test]
async fn deleting_an_assignment_removes_its_services_and_placements() {
    let db = TestDatabase::new().await.expect("test database");
    let colleague = DieselColleagueRepository::new(db.pool())
        .create(&colleague_draft("anna@rijksoverheid.nl"))
        .await
        .expect("create colleague");
    let repo = DieselAssignmentRepository::new(db.pool());
    let (service, placement) = staffed_assignment(&repo, colleague.id, None).await;

    assert!(repo.delete(service.assignment_id).await.expect("delete"));

    assert_eq!(repo.find_service(service.id).await.expect("find service"), None);
    assert_eq!(
        repo.find_placement(placement.id).await.expect("find placement"),
        None
    );
}

#[actix_rt::test]
async fn deleting_a_colleague_removes_placements_and_clears_ownership() {
    let db = TestDatabase::new().await.expect("test database");
    let colleagues = DieselColleagueRepository::new(db.pool());
    let colleague = colleagues
        .create(&colleague_draft("anna@rijksoverheid.nl"))
        .await
        .expect("create colleague");
    let repo = DieselAssignmentRepository::new(db.pool());
    let (service, placement) = staffed_assignment(&repo, colleague.id, None).await;

    assert!(colleagues.delete(colleague.id).await.expect("delete"));

    assert_eq!(
        repo.find_placement(placement.id).await.expect("find placement"),
        None
    );
    let aggregate = repo
        .find_aggregate(service.assignment_id)
        .await
        .expect("load assignment")
        .expect("assignment survives");
    assert_eq!(aggregate.assignment.owner_id, None);
    assert_eq!(aggregate.owner, None);
    let services: Vec<_> = aggregate
        .services
        .iter()
        .map(|svc| (svc.service.id, svc.placements.len()))
        .collect();
    assert_eq!(services, [(service.id, 0)]);
}

#[actix_rt::test]
async fn deleting_a_skill_clears_it_from_services() {
    let db = TestDatabase::new().await.expect("test database");
    let colleague = DieselColleagueRepository::new(db.pool())
        .create(&colleague_draft("anna@rijksoverheid.nl"))
        .await
        .expect("create colleague");
    let catalogue = DieselCatalogueRepository::new(db.pool());
    let skill = catalogue.create_skill("Architect").await.expect("skill");
    let repo = DieselAssignmentRepository::new(db.pool());
    let (service, _) = staffed_assignment(&repo, colleague.id, Some(skill.id)).await;
    assert_eq!(service.skill_id, Some(skill.id));

    assert!(catalogue.delete_skill(skill.id).await.expect("delete skill"));

    let reloaded = repo
        .find_service(service.id)
        .await
        .expect("find service")
        .expect("service survives");
    assert_eq!(reloaded.skill_id, None);
}

#[actix_rt::test]
async fn aggregate_loads_only_the_colleagues_it_references() {
    let db = TestDatabase::new().await.expect("test database");
    let colleagues = DieselColleagueRepository::new(db.pool());
    let anna = colleagues
        .create(&colleague_draft("anna@rijksoverheid.nl"))
        .await
        .expect("create colleague");
    let piet = colleagues
        .create(&colleague_draft("piet@rijksoverheid.nl"))
        .await
        .expect("create colleague");
    let repo = DieselAssignmentRepository::new(db.pool());
    let (first, _) = staffed_assignment(&repo, anna.id, None).await;
    staffed_assignment(&repo, piet.id, None).await;

    let aggregate = repo
        .find_aggregate(first.assignment_id)
        .await
        .expect("load assignment")
        .expect("assignment exists");

    assert_eq!(aggregate.owner.map(|owner| owner.id), Some(anna.id));
    let placed: Vec<_> = aggregate
        .services
        .iter()
        .flat_map(|svc| svc.placements.iter().map(|p| p.colleague.id))
        .collect();
    assert_eq!(placed, [anna.id]);
    assert_eq!(repo.list_aggregates().await.expect("list").len(), 2);
}

//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{encode, BudgetTreeInput};
    use crate::error::Error;
    use chrono::NaiveDate;
    use serde_json::json;

    fn sample_rows(user_id: i64) -> Vec<BudgetItemRow> {
        let tree: BudgetTreeInput = serde_json::from_value(json!({
            "Income": {"Standard": {"StandardIncome": [
                {"item": "Salary", "amount": 4200, "frequency": "monthly"}
            ]}},
            "Expenditure": {
                "Home": {
                    "Bills": [{"item": "Electricity", "amount": 120, "frequency": "monthly"}],
                    "RentMortgage": [{"item": "Rent", "amount": 450, "frequency": "weekly"}]
                }
            }
        }))
        .unwrap();
        encode(Some(user_id), &tree).unwrap().rows
    }

    fn new_gift(org: Option<i64>, date: &str) -> NewGift {
        NewGift {
            gift_type: "One-off".to_string(),
            organisation: org.map(|id| OrganisationRef { org_id: Some(id) }),
            amount: 50.0,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: Some("Red shield appeal".to_string()),
            receipt: None,
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_budget_items(1).unwrap().is_empty());
        assert!(db.list_organisations().unwrap().is_empty());
        assert!(!db.sqlite_version().unwrap().is_empty());
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let db = Database::in_memory().unwrap();
        let path = db.path().to_string();
        db.create_user("a@example.com", "hash").unwrap();
        drop(db);

        let reopened = Database::new_unencrypted(&path).unwrap();
        assert!(reopened.user_exists("a@example.com").unwrap());
    }

    #[test]
    fn test_user_crud() {
        let db = Database::in_memory().unwrap();
        let id = db.create_user("Jo@Example.com", "$argon2id$fake").unwrap();
        assert!(id > 0);

        let user = db.get_user_by_email("jo@example.com").unwrap().unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.hash, "$argon2id$fake");

        assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
        // Email is unique regardless of case
        assert!(matches!(
            db.create_user("JO@EXAMPLE.COM", "other"),
            Err(Error::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_replace_budget_items() {
        let db = Database::in_memory().unwrap();

        let inserted = db.replace_budget_items(7, &sample_rows(7)).unwrap();
        assert_eq!(inserted, 3);

        let stored = db.list_budget_items(7).unwrap();
        assert_eq!(stored.len(), 3);
        let bills = stored
            .iter()
            .find(|r| r.tertiary_category == "Bills")
            .unwrap();
        assert_eq!(bills.primary_category, "Expenditure");
        assert_eq!(bills.secondary_category, "Home");
        assert_eq!(bills.current_amount, "120.00");
        assert_eq!(bills.current_four_weekly_amount.as_deref(), Some("110.77"));

        // A second save replaces rather than appends
        let rows = &sample_rows(7)[..1];
        assert_eq!(db.replace_budget_items(7, rows).unwrap(), 1);
        let stored = db.list_budget_items(7).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].item_name, "Salary");
    }

    #[test]
    fn test_replace_with_empty_clears_rows() {
        let db = Database::in_memory().unwrap();
        db.replace_budget_items(3, &sample_rows(3)).unwrap();
        assert_eq!(db.replace_budget_items(3, &[]).unwrap(), 0);
        assert!(db.list_budget_items(3).unwrap().is_empty());
    }

    #[test]
    fn test_replace_is_per_user() {
        let db = Database::in_memory().unwrap();
        db.replace_budget_items(1, &sample_rows(1)).unwrap();
        db.replace_budget_items(2, &sample_rows(2)[..1]).unwrap();

        assert_eq!(db.list_budget_items(1).unwrap().len(), 3);
        assert_eq!(db.list_budget_items(2).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_insert_keeps_previous_rows() {
        let db = Database::in_memory().unwrap();
        db.replace_budget_items(5, &sample_rows(5)).unwrap();

        db.conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_boom BEFORE INSERT ON current_budget_items
                 WHEN NEW.item_name = 'boom'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let mut rows = sample_rows(5);
        rows[1].item_name = "boom".to_string();
        assert!(db.replace_budget_items(5, &rows).is_err());

        let stored = db.list_budget_items(5).unwrap();
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().all(|r| r.item_name != "boom"));
    }

    #[test]
    fn test_organisations() {
        let db = Database::in_memory().unwrap();
        let red_cross = db.add_organisation("Red Cross", Some(50169561394)).unwrap();
        db.add_organisation("Salvation Army", Some(57507607613)).unwrap();

        let orgs = db.list_organisations().unwrap();
        assert_eq!(orgs.len(), 2);
        assert_eq!(orgs[0].entity_name, "Red Cross");
        assert_eq!(orgs[0].org_id, red_cross);
        assert_eq!(orgs[0].abn, Some(50169561394));

        // ABN is unique
        assert!(db.add_organisation("Duplicate", Some(50169561394)).is_err());
        assert!(db.get_organisation(999).unwrap().is_none());
    }

    #[test]
    fn test_gifts_by_year() {
        let db = Database::in_memory().unwrap();
        let org = db.add_organisation("Salvation Army", Some(57507607613)).unwrap();

        db.insert_gift(1, &new_gift(Some(org), "2025-05-23")).unwrap();
        db.insert_gift(1, &new_gift(None, "2025-06-27")).unwrap();
        db.insert_gift(1, &new_gift(Some(org), "2024-12-31")).unwrap();
        db.insert_gift(2, &new_gift(Some(org), "2025-01-01")).unwrap();

        let gifts = db.list_gifts_for_year(1, 2025).unwrap();
        assert_eq!(gifts.len(), 2);
        assert_eq!(gifts[0].organisation.as_deref(), Some("Salvation Army"));
        assert!(gifts[0].dgr);
        // A gift without an organisation is still returned
        assert_eq!(gifts[1].organisation, None);
        assert!(!gifts[1].dgr);
        assert_eq!(gifts[1].date, NaiveDate::from_ymd_opt(2025, 6, 27).unwrap());

        assert_eq!(db.list_gifts_for_year(1, 2024).unwrap().len(), 1);
        assert!(db.list_gifts_for_year(1, 2023).unwrap().is_empty());
        assert_eq!(db.list_gifts(1).unwrap().len(), 3);
    }

    #[test]
    fn test_insert_gift_unknown_organisation() {
        let db = Database::in_memory().unwrap();
        let err = db.insert_gift(1, &new_gift(Some(42), "2025-05-23")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(db.list_gifts(1).unwrap().is_empty());
    }

    #[test]
    fn test_delete_gift() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_gift(9, &new_gift(None, "2025-02-02")).unwrap();

        assert_eq!(db.gift_owner(id).unwrap(), Some(9));
        assert!(db.delete_gift(id).unwrap());
        assert!(!db.delete_gift(id).unwrap());
        assert_eq!(db.gift_owner(id).unwrap(), None);
    }
}

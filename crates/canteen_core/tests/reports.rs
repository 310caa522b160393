mod common;

use canteen_core::{
    Caller, FixedClock, Reservation, ReportError, ReportService, Role, SqliteLedgerStore,
    SqliteMenuCatalog, SqliteUserDirectory, CSV_CONTENT_TYPE,
};
use common::{add_employee, add_meal, add_user, at, date, insert_raw, orders};
use rusqlite::Connection;

type TestReports<'c> = ReportService<
    SqliteLedgerStore<'c>,
    SqliteMenuCatalog<'c>,
    SqliteUserDirectory<'c>,
    &'c FixedClock,
>;

fn reports<'c>(conn: &'c Connection, clock: &'c FixedClock) -> TestReports<'c> {
    ReportService::new(
        SqliteLedgerStore::new(conn),
        SqliteMenuCatalog::new(conn),
        SqliteUserDirectory::new(conn),
        clock,
    )
}

fn admin(conn: &Connection, role: Role) -> Caller {
    let user = add_user(conn, "admin", "Správce", role);
    Caller::new(user.id, user.role)
}

#[test]
fn daily_export_orders_rows_by_choice_then_surname() {
    let conn = canteen_core::open_db_in_memory().unwrap();
    let clock = FixedClock::new(at(2025, 3, 9, 10, 0));
    let kitchen = admin(&conn, Role::AdminMeal);
    let a = add_employee(&conn, "a", "Beneš");
    let b = add_employee(&conn, "b", "Adam");
    let c = add_employee(&conn, "c", "Čermák");
    let soup = add_meal(&conn, date(2025, 3, 10), "Soup");
    let goulash = add_meal(&conn, date(2025, 3, 10), "Goulash");
    add_meal(&conn, date(2025, 3, 11), "Risotto");

    let service = orders(&conn, &clock);
    service.place(&c, soup.id).unwrap();
    service.place(&b, goulash.id).unwrap();
    service.place(&a, soup.id).unwrap();

    let export = reports(&conn, &clock)
        .daily_export(&kitchen, "2025-03-10")
        .unwrap();
    let rows: Vec<_> = export
        .rows
        .iter()
        .map(|row| (row.choice_number, row.meal_name.as_str(), row.last_name.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![(1, "Soup", "Beneš"), (1, "Soup", "Čermák"), (2, "Goulash", "Adam")]
    );

    assert_eq!(export.file_name(), "orders_2025-03-10.csv");
    assert_eq!(CSV_CONTENT_TYPE, "text/csv; charset=utf-8");
    assert_eq!(
        export.render_csv(),
        "\u{feff}Choice Number;Meal Name;First Name;Last Name;Personal Number\n\
         1;Soup;A;Beneš;PN-a\n\
         1;Soup;C;Čermák;PN-c\n\
         2;Goulash;B;Adam;PN-b"
    );
}

#[test]
fn daily_export_drops_reservations_with_deleted_meal_or_holder() {
    let conn = canteen_core::open_db_in_memory().unwrap();
    let clock = FixedClock::new(at(2025, 3, 9, 10, 0));
    let kitchen = admin(&conn, Role::AdminUser);
    let a = add_employee(&conn, "a", "Beneš");
    let b = add_employee(&conn, "b", "Adam");
    let c = add_employee(&conn, "c", "Čermák");
    let soup = add_meal(&conn, date(2025, 3, 10), "Soup");
    let goulash = add_meal(&conn, date(2025, 3, 10), "Goulash");
    let service = orders(&conn, &clock);
    service.place(&a, soup.id).unwrap();
    service.place(&b, goulash.id).unwrap();
    service.place(&c, goulash.id).unwrap();

    SqliteMenuCatalog::new(&conn).delete_meal(soup.id).unwrap();
    SqliteUserDirectory::new(&conn).delete_user(c.user_id).unwrap();

    let export = reports(&conn, &clock)
        .daily_export(&kitchen, "2025-03-10")
        .unwrap();
    assert_eq!(export.choices.len(), 1);
    assert_eq!(export.rows.len(), 1);
    assert_eq!(export.rows[0].last_name, "Adam");
    assert_eq!(export.rows[0].choice_number, 1);
}

#[test]
fn daily_export_for_a_date_without_menu_is_empty() {
    let conn = canteen_core::open_db_in_memory().unwrap();
    let clock = FixedClock::new(at(2025, 3, 9, 10, 0));
    let kitchen = admin(&conn, Role::AdminMeal);

    let export = reports(&conn, &clock)
        .daily_export(&kitchen, "2025-03-10")
        .unwrap();
    assert!(export.rows.is_empty());
    assert_eq!(export.render_csv(), "");
}

#[test]
fn daily_export_checks_role_and_date_format() {
    let conn = canteen_core::open_db_in_memory().unwrap();
    let clock = FixedClock::new(at(2025, 3, 9, 10, 0));
    let employee = add_employee(&conn, "a", "Beneš");
    let kitchen = admin(&conn, Role::AdminMeal);
    let service = reports(&conn, &clock);

    let err = service.daily_export(&employee, "2025-03-10").unwrap_err();
    assert!(matches!(err, ReportError::Forbidden(Role::Employee)));

    let err = service.daily_export(&kitchen, "10.3.2025").unwrap_err();
    assert!(matches!(err, ReportError::InvalidInput(_)));
    let err = service.daily_export(&kitchen, "2025-02-30").unwrap_err();
    assert!(matches!(err, ReportError::InvalidInput(_)));
}

#[test]
fn monthly_report_is_refused_until_the_month_is_over() {
    let conn = canteen_core::open_db_in_memory().unwrap();
    let clock = FixedClock::new(at(2025, 3, 31, 23, 59));
    let payroll = admin(&conn, Role::AdminUser);
    let service = reports(&conn, &clock);

    for month in ["2025-03", "2025-04"] {
        let err = service.monthly_report(&payroll, month).unwrap_err();
        assert!(matches!(err, ReportError::MonthNotClosed(m) if m.to_string() == month));
    }

    clock.set(at(2025, 4, 1, 0, 0));
    assert!(service.monthly_report(&payroll, "2025-03").is_ok());
}

#[test]
fn monthly_report_counts_every_user_zero_filled_and_sorted_by_surname() {
    let conn = canteen_core::open_db_in_memory().unwrap();
    let clock = FixedClock::new(at(2025, 1, 20, 10, 0));
    let payroll = admin(&conn, Role::AdminUser);
    let a = add_employee(&conn, "a", "Šustr");
    let b = add_employee(&conn, "b", "Adam");
    add_employee(&conn, "c", "Čermák");
    let february = [
        add_meal(&conn, date(2025, 2, 3), "Soup"),
        add_meal(&conn, date(2025, 2, 4), "Goulash"),
        add_meal(&conn, date(2025, 2, 28), "Risotto"),
    ];
    let march = add_meal(&conn, date(2025, 3, 3), "Soup");

    let service = orders(&conn, &clock);
    for meal in &february {
        service.place(&a, meal.id).unwrap();
    }
    service.place(&b, february[2].id).unwrap();
    service.place(&b, march.id).unwrap();
    // Released-but-unclaimed reservations still count for their holder.
    let mut released = Reservation::place(payroll.user_id, &february[0]);
    released.release();
    insert_raw(&conn, &released);

    clock.set(at(2025, 3, 15, 9, 0));
    let report = reports(&conn, &clock)
        .monthly_report(&payroll, "2025-02")
        .unwrap();
    let rows: Vec<_> = report
        .rows
        .iter()
        .map(|row| (row.last_name.as_str(), row.count))
        .collect();
    assert_eq!(
        rows,
        vec![("Adam", 1), ("Čermák", 0), ("Správce", 1), ("Šustr", 3)]
    );
    assert_eq!(report.total_meals(), 5);
    assert_eq!(report.file_name(), "meal_summary_2025-02.csv");
    assert_eq!(
        report.render_csv(),
        "\u{feff}Personal Number;Last Name;First Name;Login;Meal Count\n\
         PN-b;Adam;B;b;1\n\
         PN-c;Čermák;C;c;0\n\
         PN-admin;Správce;ADMIN;admin;1\n\
         PN-a;Šustr;A;a;3"
    );

    let json = serde_json::to_value(&report.rows[0]).unwrap();
    assert_eq!(json["personalNumber"], "PN-b");
    assert_eq!(json["count"], 1);
}

#[test]
fn monthly_report_is_for_user_administrators_only() {
    let conn = canteen_core::open_db_in_memory().unwrap();
    let clock = FixedClock::new(at(2025, 3, 15, 9, 0));
    let kitchen = admin(&conn, Role::AdminMeal);
    let service = reports(&conn, &clock);

    let err = service.monthly_report(&kitchen, "2025-02").unwrap_err();
    assert!(matches!(err, ReportError::Forbidden(Role::AdminMeal)));

    let payroll = add_user(&conn, "mzdy", "Mzdová", Role::AdminUser);
    let payroll = Caller::new(payroll.id, payroll.role);
    let err = service.monthly_report(&payroll, "2025-2").unwrap_err();
    assert!(matches!(err, ReportError::InvalidInput(_)));
}

#[test]
fn user_history_lists_all_reservations_newest_first_with_choice_numbers() {
    let conn = canteen_core::open_db_in_memory().unwrap();
    let clock = FixedClock::new(at(2025, 1, 20, 10, 0));
    let kitchen = admin(&conn, Role::AdminMeal);
    let jana = add_employee(&conn, "jana", "Nováková");
    add_meal(&conn, date(2025, 2, 3), "Soup");
    let goulash = add_meal(&conn, date(2025, 2, 3), "Goulash");
    let risotto = add_meal(&conn, date(2025, 2, 4), "Risotto");
    let dumplings = add_meal(&conn, date(2025, 2, 5), "Dumplings");

    let service = orders(&conn, &clock);
    let first = service.place(&jana, goulash.id).unwrap();
    let second = service.place(&jana, risotto.id).unwrap();
    let third = service.place(&jana, dumplings.id).unwrap();
    SqliteMenuCatalog::new(&conn).delete_meal(dumplings.id).unwrap();

    let history = reports(&conn, &clock)
        .user_history(&kitchen, jana.user_id)
        .unwrap();
    let entries: Vec<_> = history
        .iter()
        .map(|entry| (entry.id, entry.date, entry.meal_choice, entry.in_exchange))
        .collect();
    assert_eq!(
        entries,
        vec![
            (third.id, date(2025, 2, 5), None, false),
            (second.id, date(2025, 2, 4), Some(1), false),
            (first.id, date(2025, 2, 3), Some(2), false),
        ]
    );

    let err = reports(&conn, &clock)
        .user_history(&jana, jana.user_id)
        .unwrap_err();
    assert!(matches!(err, ReportError::Forbidden(Role::Employee)));
}

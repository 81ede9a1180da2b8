use anyhow::Result;
use chrono::NaiveDate;
use tradein_reconciler::*;

/// Loads an in-memory CSV fixture into a RawTable, mapping empty cells to
/// missing values the way a spreadsheet import would.
fn table_from_csv(data: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::None)
        .from_reader(data.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut table = RawTable::new(headers);
    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|cell| {
                if cell.trim().is_empty() {
                    None
                } else {
                    Some(cell.to_string())
                }
            })
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}

const SPOC_CSV: &str = "\
Spoc Name,Store State,Zone,Weekoff Day,Store Name,February Target
asha,ka,south,Sunday,Indiranagar,40
ravi,tamil nadu,south,Monday,Adyar,30
meena,kl,south,Vacant,Kochi Central,20
";

const MAPLE_CSV: &str = "\
Service Number,Status,Old IMEI No,Created Date,Month,Year,Store Name,Vendor Name,Payment Amount,Partner / Source,Product Category,Product Type,Old Product Name,New Product Name,Maple Bid
SR-1,Completed,111111111111111,02/02/2025,2,2025,INDIRANAGAR,Maple,21000,Walk-in,Phone,Mobile Phone,iphone 12,iphone 15,21500
SR-2,Completed,222222222222222,09/02/2025,2,2025,Adyar,Maple,9000,Walk-in,Phone,mobile,galaxy s21,galaxy s24,9500
SR-3,Completed,,16/02/2025,2,2025,Indiranagar,Maple,4000,Walk-in,Wearable,Apple Watch,watch se,watch 9,4200
";

// The Cashify export labels things differently: "Order No." instead of
// "Order Id" and a stray-whitespace " Partner Name" column standing in for
// the representative.
const CASHIFY_CSV: &str = "\
Order No.,Order Date,Month,Year,Order Status, Partner Name,Store Name,Pickup Type,Old Device IMEI,Product Type,Product Category,Old Device Name,New Device IMEI,New Device Name,Initial Device Amount
C-1,02/02/2025,February,2025,Completed,asha,Indiranagar,Store,333333333333333,Mobile Phone,Phone,pixel 7,,,18000
C-2,05/02/2025,February,2025,Completed,ravi,Adyar,Store,444444444444444,Samsung Watch,Wearable,galaxy watch,,,6000
C-3,12/02/2025,February,2025,Completed,,Halcyon Mall,Store,555555555555555,Laptop,Laptop,macbook air,,,52000
";

fn reconcile_all(
    session: &mut ReconcileSession,
) -> Result<(Vec<SpocRosterEntry>, Vec<TradeInRecord>, Vec<TradeInRecord>)> {
    let spoc_table = table_from_csv(SPOC_CSV)?;
    let maple_table = table_from_csv(MAPLE_CSV)?;
    let cashify_table = table_from_csv(CASHIFY_CSV)?;

    let roster = session.prepare_roster(&spoc_table)?;

    // The Cashify sheet needs one fuzzy-assisted mapping decision.
    let plan = plan_mapping(&cashify_table, Dataset::Cashify)?;
    let mut mapping = ColumnMapping::new();
    for unresolved in &plan.unresolved {
        match unresolved.canonical.as_str() {
            "Order Id" => {
                let best = unresolved
                    .candidates
                    .first()
                    .expect("similarity should suggest Order No.");
                assert_eq!(best.header, "Order No.");
                mapping.insert(
                    unresolved.canonical.clone(),
                    ColumnChoice::Source(best.header.clone()),
                );
            }
            "Partner Name" => {
                mapping.insert(
                    unresolved.canonical.clone(),
                    ColumnChoice::Source(" Partner Name".to_string()),
                );
            }
            other => panic!("unexpected unresolved column: {other}"),
        }
    }
    session.set_column_mapping(Dataset::Cashify, mapping);

    let maple = session.prepare_channel(Channel::Maple, &maple_table, &roster)?;
    let cashify = session.prepare_channel(Channel::Cashify, &cashify_table, &roster)?;
    Ok((roster, maple, cashify))
}

#[test]
fn test_full_reconciliation_pipeline() -> Result<()> {
    let mut session = ReconcileSession::new();
    let (roster, maple, cashify) = reconcile_all(&mut session)?;

    assert_eq!(roster.len(), 3);
    assert_eq!(maple.len(), 3);
    assert_eq!(cashify.len(), 3);

    // States come from the roster, canonicalized from synonyms.
    assert!(maple
        .iter()
        .filter(|r| r.store_name.as_deref() == Some("Indiranagar"))
        .all(|r| r.store_state == "Karnataka" && r.zone == "South"));

    // Month names are normalized whether the sheet carried "2" or "February".
    assert!(maple.iter().all(|r| r.month.as_deref() == Some("February")));
    assert!(cashify.iter().all(|r| r.month.as_deref() == Some("February")));

    // Product categorization runs on the raw product type.
    let categories: Vec<ProductCategory> =
        maple.iter().map(|r| r.product_category).collect();
    assert_eq!(
        categories,
        vec![
            ProductCategory::MobilePhone,
            ProductCategory::MobilePhone,
            ProductCategory::SmartWatchApple,
        ]
    );

    Ok(())
}

#[test]
fn test_unmatched_store_falls_back_to_unknown() -> Result<()> {
    let mut session = ReconcileSession::new();
    let (_, _, cashify) = reconcile_all(&mut session)?;

    let stray = cashify
        .iter()
        .find(|r| r.store_name.as_deref() == Some("Halcyon Mall"))
        .expect("record for unrostered store");
    assert_eq!(stray.store_state, UNKNOWN);
    assert_eq!(stray.zone, UNKNOWN);
    assert_eq!(stray.spoc_id, None);
    Ok(())
}

#[test]
fn test_identity_is_stable_across_channels_and_imports() -> Result<()> {
    let mut session = ReconcileSession::new();
    let (roster, maple, cashify) = reconcile_all(&mut session)?;

    let asha_roster_id = roster
        .iter()
        .find(|e| e.spoc_name == "Asha")
        .and_then(|e| e.spoc_id)
        .expect("roster id for Asha");

    // Maple rows have no Spoc Name column; the roster join supplies it, and
    // the resolver hands back the same id either way.
    let asha_maple: Vec<_> = maple
        .iter()
        .filter(|r| r.spoc_name.as_deref() == Some("Asha"))
        .collect();
    assert!(!asha_maple.is_empty());
    assert!(asha_maple.iter().all(|r| r.spoc_id == Some(asha_roster_id)));

    let asha_cashify = cashify
        .iter()
        .find(|r| r.spoc_name.as_deref() == Some("Asha"))
        .expect("Cashify record for Asha");
    assert_eq!(asha_cashify.spoc_id, Some(asha_roster_id));

    // A second import within the same session reuses every identifier.
    let ids_before = session.spoc_ids().len();
    let (roster_again, _, _) = reconcile_all(&mut session)?;
    assert_eq!(session.spoc_ids().len(), ids_before);
    assert_eq!(
        roster_again
            .iter()
            .find(|e| e.spoc_name == "Asha")
            .and_then(|e| e.spoc_id),
        Some(asha_roster_id)
    );
    Ok(())
}

#[test]
fn test_weekoff_loss_classification() -> Result<()> {
    let mut session = ReconcileSession::new();
    let (roster, _, cashify) = reconcile_all(&mut session)?;

    let weekoff_map = spoc_weekoffs(&roster, 2025, "February")?;
    // Meena is vacant, so only Asha and Ravi carry weekoff calendars.
    assert_eq!(weekoff_map.len(), 2);

    let asha_offs = &weekoff_map["Asha"];
    assert_eq!(asha_offs.len(), 4);
    assert!(asha_offs.contains(&NaiveDate::from_ymd_opt(2025, 2, 2).unwrap()));

    // C-1 landed at Asha's store on Sunday Feb 2nd: a rest-day loss.
    let rest_day_losses: Vec<_> = cashify
        .iter()
        .filter(|r| r.store_name.as_deref() == Some("Indiranagar"))
        .filter(|r| {
            r.transaction_date
                .map(|d| asha_offs.contains(&d))
                .unwrap_or(false)
        })
        .collect();
    assert_eq!(rest_day_losses.len(), 1);
    assert_eq!(rest_day_losses[0].record_id, "C-1");
    Ok(())
}

#[test]
fn test_market_share_and_targets_over_reconciled_data() -> Result<()> {
    let mut session = ReconcileSession::new();
    let (roster, maple, cashify) = reconcile_all(&mut session)?;

    let maple_feb = filter_by_date(&maple, 2025, Some("February"), None);
    let cashify_feb = filter_by_date(&cashify, 2025, Some("February"), None);
    let total = (maple_feb.len() + cashify_feb.len()) as u64;
    let share = market_share(maple_feb.len() as u64, total);
    assert!((share - 50.0).abs() < f64::EPSILON);

    let asha = roster.iter().find(|e| e.spoc_name == "Asha").unwrap();
    let asha_count = maple_feb
        .iter()
        .filter(|r| r.spoc_id == asha.spoc_id)
        .count() as u64;
    let achievement = target_achievement(asha_count, asha.target_for("February").unwrap());
    assert!((achievement - 5.0).abs() < f64::EPSILON);
    Ok(())
}

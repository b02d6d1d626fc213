use simcore::graphql::GraphQLRegistry;
use simcore::reset;
use simcore::router::MockRouter;
use simcore::server::MockBackend;

use crate::graphql;
use crate::resources::{
    audit, billing, communications, faults, field_service, inventory, licensing, notifications,
    orchestration, partners, radius, search, subscribers,
};

/// Assemble the full REST route table. Registration order is load-bearing:
/// each module keeps its specific literal routes ahead of its
/// parameterized ones, and `shadowed_routes` on the result must stay
/// empty (there is a test pinning that).
pub fn rest_router() -> MockRouter {
    let mut router = MockRouter::new();
    subscribers::register(&mut router);
    billing::register(&mut router);
    faults::register(&mut router);
    field_service::register(&mut router);
    partners::register(&mut router);
    licensing::register(&mut router);
    search::register(&mut router);
    communications::register(&mut router);
    notifications::register(&mut router);
    radius::register(&mut router);
    inventory::register(&mut router);
    audit::register(&mut router);
    orchestration::register(&mut router);
    router
}

pub fn graphql_registry() -> GraphQLRegistry {
    let mut registry = GraphQLRegistry::new();
    graphql::register(&mut registry);
    registry
}

/// The fully assembled mock backend: every REST resource, the GraphQL
/// operations, and the reset registry wired up.
pub fn mock_backend() -> MockBackend {
    register_resets();
    MockBackend::new(rest_router(), graphql_registry())
}

/// Iterate every module's clear function so tests start from a blank
/// slate. `simcore::reset::reset_all()` reaches the same functions once a
/// backend has been assembled.
pub fn reset_all_stores() {
    subscribers::clear_subscribers();
    billing::clear_billing();
    faults::clear_faults();
    field_service::clear_field_service();
    partners::clear_partners();
    licensing::clear_licensing();
    search::clear_search();
    communications::clear_communications();
    notifications::clear_notifications();
    radius::clear_radius();
    inventory::clear_inventory();
    audit::clear_audit();
    orchestration::clear_orchestration();
}

fn register_resets() {
    reset::register_reset("subscribers", subscribers::clear_subscribers);
    reset::register_reset("billing", billing::clear_billing);
    reset::register_reset("faults", faults::clear_faults);
    reset::register_reset("field_service", field_service::clear_field_service);
    reset::register_reset("partners", partners::clear_partners);
    reset::register_reset("licensing", licensing::clear_licensing);
    reset::register_reset("search", search::clear_search);
    reset::register_reset("communications", communications::clear_communications);
    reset::register_reset("notifications", notifications::clear_notifications);
    reset::register_reset("radius", radius::clear_radius);
    reset::register_reset("inventory", inventory::clear_inventory);
    reset::register_reset("audit", audit::clear_audit);
    reset::register_reset("orchestration", orchestration::clear_orchestration);
}

/// A coherent fixture set across every store, used by the `backend`
/// binary so a frontend pointed at the mock sees plausible data.
pub fn seed_demo_data() {
    subscribers::seed_subscribers(vec![
        subscribers::subscriber(subscribers::SubscriberOverrides {
            id: Some("SUB-1001".to_string()),
            name: Some("Mara Voss".to_string()),
            email: Some("mara.voss@example.net".to_string()),
            plan: Some("fiber_1000".to_string()),
            partner_id: Some("PRT-1".to_string()),
            ..Default::default()
        }),
        subscribers::subscriber(subscribers::SubscriberOverrides {
            id: Some("SUB-1002".to_string()),
            name: Some("Theo Brandt".to_string()),
            status: Some(subscribers::SubscriberStatus::Suspended),
            balance_cents: Some(12_400),
            ..Default::default()
        }),
        subscribers::subscriber(subscribers::SubscriberOverrides {
            id: Some("SUB-1003".to_string()),
            name: Some("Ines Kowalczyk".to_string()),
            plan: Some("wireless_50".to_string()),
            ..Default::default()
        }),
    ]);

    billing::seed_invoices(vec![
        billing::invoice(billing::InvoiceOverrides {
            id: Some("INV-1".to_string()),
            subscriber_id: Some("SUB-1001".to_string()),
            ..Default::default()
        }),
        billing::invoice(billing::InvoiceOverrides {
            id: Some("INV-2".to_string()),
            subscriber_id: Some("SUB-1002".to_string()),
            status: Some(billing::InvoiceStatus::PastDue),
            amount_cents: Some(12_400),
            ..Default::default()
        }),
    ]);
    billing::seed_payments(vec![billing::payment(billing::PaymentOverrides {
        invoice_id: Some("INV-1".to_string()),
        ..Default::default()
    })]);

    faults::seed_alarms(vec![
        faults::alarm(faults::AlarmOverrides {
            id: Some("ALM-1".to_string()),
            device: Some("olt-01".to_string()),
            severity: Some(faults::AlarmSeverity::Critical),
            ..Default::default()
        }),
        faults::alarm(faults::AlarmOverrides {
            id: Some("ALM-2".to_string()),
            device: Some("ap-west-3".to_string()),
            severity: Some(faults::AlarmSeverity::Minor),
            message: Some("high retransmit rate".to_string()),
            ..Default::default()
        }),
    ]);
    faults::seed_tickets(vec![faults::ticket(faults::TicketOverrides {
        id: Some("TCK-1".to_string()),
        subscriber_id: Some("SUB-1002".to_string()),
        subject: Some("intermittent drops".to_string()),
        ..Default::default()
    })]);

    field_service::seed_work_orders(vec![field_service::work_order(
        field_service::WorkOrderOverrides {
            id: Some("WO-1".to_string()),
            subscriber_id: Some("SUB-1003".to_string()),
            technician: Some("t.okafor".to_string()),
            status: Some(field_service::WorkOrderStatus::Assigned),
            ..Default::default()
        },
    )]);

    partners::seed_partners(vec![partners::partner(partners::PartnerOverrides {
        id: Some("PRT-1".to_string()),
        name: Some("Northlink Wholesale".to_string()),
        tier: Some(partners::PartnerTier::Wholesale),
        ..Default::default()
    })]);

    licensing::seed_entitlements(vec![licensing::entitlement(
        licensing::EntitlementOverrides {
            feature: Some("radius_accounting".to_string()),
            seats: Some(25),
            seats_used: Some(11),
            ..Default::default()
        },
    )]);

    search::seed_search_documents(vec![
        search::search_document(search::SearchDocumentOverrides {
            kind: Some("subscriber".to_string()),
            title: Some("Mara Voss".to_string()),
            body: Some("fiber_1000 subscriber, SUB-1001".to_string()),
            href: Some("/subscribers/SUB-1001".to_string()),
            ..Default::default()
        }),
        search::search_document(search::SearchDocumentOverrides {
            kind: Some("ticket".to_string()),
            title: Some("intermittent drops".to_string()),
            body: Some("TCK-1 for SUB-1002".to_string()),
            href: Some("/faults/tickets/TCK-1".to_string()),
            ..Default::default()
        }),
    ]);

    notifications::seed_notification_fixtures();

    radius::seed_sessions(vec![radius::radius_session(radius::RadiusSessionOverrides {
        id: Some("RAD-1".to_string()),
        subscriber_id: Some("SUB-1001".to_string()),
        input_octets: Some(48_213_992),
        output_octets: Some(981_207_441),
        ..Default::default()
    })]);

    inventory::seed_olts(vec![inventory::olt(inventory::OltOverrides {
        id: Some("OLT-1".to_string()),
        site: Some("central".to_string()),
        ..Default::default()
    })]);
    inventory::seed_onts(vec![inventory::ont(inventory::OntOverrides {
        id: Some("ONT-1".to_string()),
        olt_id: Some("OLT-1".to_string()),
        subscriber_id: Some("SUB-1001".to_string()),
        ..Default::default()
    })]);
    inventory::seed_access_points(vec![inventory::access_point(
        inventory::AccessPointOverrides {
            id: Some("AP-1".to_string()),
            name: Some("ap-west-3".to_string()),
            clients: Some(37),
            ..Default::default()
        },
    )]);

    audit::seed_audit_events(vec![audit::audit_event(audit::AuditEventOverrides {
        actor: Some("ops@isp".to_string()),
        action: Some("suspend".to_string()),
        target: Some("SUB-1002".to_string()),
        ..Default::default()
    })]);

    orchestration::seed_workflows(vec![orchestration::workflow(
        orchestration::WorkflowOverrides {
            id: Some("WF-1".to_string()),
            kind: Some("provision_subscriber".to_string()),
            status: Some(orchestration::WorkflowStatus::Running),
            requested_by: Some("ops@isp".to_string()),
            ..Default::default()
        },
    )]);

    tracing::info!("demo fixtures seeded");
}

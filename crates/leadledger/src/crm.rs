//! Built-in CRM connector with canned records.
//!
//! Stands in for a real Salesforce or HubSpot integration when none is
//! configured, so the import and export flows (and their charges) can be
//! exercised end to end.

use leadledger_core::{
    Company, Contact, CrmConnection, CrmConnector, CrmExportRecord, CrmKind, NewCompany,
    NewContact, Result,
};

/// Connector that imports a small fixed record pool and accepts every
/// export, assigning sequential remote ids.
#[derive(Debug, Clone, Copy)]
pub struct DemoCrm {
    kind: CrmKind,
}

impl DemoCrm {
    /// Create a connector for the given CRM.
    #[must_use]
    pub const fn new(kind: CrmKind) -> Self {
        Self { kind }
    }

    fn remote_id(self, index: usize) -> String {
        let prefix = match self.kind {
            CrmKind::Salesforce => "SF",
            CrmKind::Hubspot => "HS",
        };
        format!("{}-{}", prefix, 1001 + index)
    }
}

impl CrmConnector for DemoCrm {
    fn kind(&self) -> CrmKind {
        self.kind
    }

    async fn test_connection(&self) -> Result<CrmConnection> {
        Ok(CrmConnection {
            connected: true,
            message: format!("Connected to {}", self.kind.display_name()),
        })
    }

    async fn import_contacts(&self) -> Result<Vec<NewContact>> {
        Ok(vec![
            NewContact {
                full_name: "Michael Chen".into(),
                email: Some("m.chen@acmesoft.example.com".into()),
                job_title: Some("Head of Growth".into()),
                company_name: Some("AcmeSoft".into()),
                industry: Some("Software".into()),
                location: Some("Seattle, WA".into()),
                ..NewContact::default()
            },
            NewContact {
                full_name: "Priya Patel".into(),
                email: Some("priya@northwind.example.com".into()),
                job_title: Some("Procurement Manager".into()),
                company_name: Some("Northwind Traders".into()),
                industry: Some("Retail".into()),
                location: Some("Chicago, IL".into()),
                ..NewContact::default()
            },
        ])
    }

    async fn import_companies(&self) -> Result<Vec<NewCompany>> {
        Ok(vec![
            NewCompany {
                name: "AcmeSoft".into(),
                industry: Some("Software".into()),
                website: Some("https://acmesoft.example.com".into()),
                size: Some("100-500".into()),
                location: Some("Seattle, WA".into()),
                ..NewCompany::default()
            },
            NewCompany {
                name: "Northwind Traders".into(),
                industry: Some("Retail".into()),
                website: Some("https://northwind.example.com".into()),
                size: Some("500-1000".into()),
                location: Some("Chicago, IL".into()),
                ..NewCompany::default()
            },
        ])
    }

    async fn export_contacts(&self, contacts: &[Contact]) -> Result<Vec<CrmExportRecord>> {
        Ok((0..contacts.len())
            .map(|i| CrmExportRecord {
                success: true,
                remote_id: Some(self.remote_id(i)),
            })
            .collect())
    }

    async fn export_companies(&self, companies: &[Company]) -> Result<Vec<CrmExportRecord>> {
        Ok((0..companies.len())
            .map(|i| CrmExportRecord {
                success: true,
                remote_id: Some(self.remote_id(i)),
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_import_pool_and_export_ids() {
        let crm = DemoCrm::new(CrmKind::Salesforce);
        assert_eq!(crm.kind(), CrmKind::Salesforce);

        let contacts = crm.import_contacts().await.unwrap();
        assert_eq!(contacts.len(), 2);

        let records = crm.export_companies(&[]).await.unwrap();
        assert!(records.is_empty());

        assert_eq!(crm.remote_id(0), "SF-1001");
        assert_eq!(DemoCrm::new(CrmKind::Hubspot).remote_id(1), "HS-1002");
    }
}

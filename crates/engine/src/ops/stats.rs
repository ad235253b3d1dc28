//! Read-side derivations: totals, pocket breakdown, pending amounts.

use crate::{Instrument, InstrumentPending, Money, Pocket, ResultEngine, Totals};

use super::Engine;

impl Engine {
    /// Headline income/expense/balance figures over all the owner's
    /// records.
    pub async fn totals(&self, owner_id: &str) -> ResultEngine<Totals> {
        Ok(self.snapshot(owner_id).await?.totals())
    }

    /// Per-pocket derived amounts plus the unassigned bucket, pockets
    /// sorted by name.
    pub async fn pocket_balances(
        &self,
        owner_id: &str,
    ) -> ResultEngine<(Vec<(Pocket, Money)>, Money)> {
        let snapshot = self.snapshot(owner_id).await?;
        let mut balances: Vec<(Pocket, Money)> = snapshot
            .pockets
            .values()
            .map(|pocket| (pocket.clone(), snapshot.pocket_balance(pocket)))
            .collect();
        balances.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name));
        Ok((balances, snapshot.unassigned_balance()))
    }

    /// Pending amounts for every credit instrument, sorted by display
    /// name.
    pub async fn credit_pendings(
        &self,
        owner_id: &str,
    ) -> ResultEngine<Vec<(Instrument, InstrumentPending)>> {
        let snapshot = self.snapshot(owner_id).await?;
        let mut out: Vec<(Instrument, InstrumentPending)> = snapshot
            .credit_pendings()
            .into_iter()
            .filter_map(|pending| {
                snapshot
                    .instruments
                    .get(&pending.instrument_id)
                    .map(|instrument| (instrument.clone(), pending))
            })
            .collect();
        out.sort_by(|(a, _), (b, _)| a.display_name.cmp(&b.display_name));
        Ok(out)
    }
}

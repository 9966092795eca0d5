//! Draft reservation: junctions picked from the topology and the pipes that
//! link them.
//!
//! A [`Reservation`] is never mutated in place. Every update returns a new
//! snapshot, leaving the previous one intact for whoever still holds it.

use std::collections::BTreeMap;

use crate::error::EdgeRejection;

/// A topology node included in the draft reservation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Junction {
	pub id: String,
	pub label: String,
}

impl Junction {
	pub fn new(id: impl Into<String>) -> Self {
		let id = id.into();
		Self {
			label: id.clone(),
			id,
		}
	}
}

/// A link between two junctions, identified as `"<from> -- <to>"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pipe {
	pub id: String,
	pub from: String,
	pub to: String,
}

impl Pipe {
	pub fn between(from: &str, to: &str) -> Self {
		Self {
			id: format!("{from} -- {to}"),
			from: from.to_owned(),
			to: to.to_owned(),
		}
	}

	pub fn touches(&self, junction: &str) -> bool {
		self.from == junction || self.to == junction
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reservation {
	junctions: BTreeMap<String, Junction>,
	pipes: BTreeMap<String, Pipe>,
}

/// Result of folding a topology selection into a reservation.
#[derive(Clone, Debug, Default)]
pub struct Commit {
	pub reservation: Reservation,
	/// Junctions created by this commit, in selection order.
	pub junctions: Vec<Junction>,
	/// Pipes created by this commit, in creation order.
	pub pipes: Vec<Pipe>,
	/// Last junction added after the commit.
	pub last: Option<String>,
}

impl Commit {
	pub fn is_empty(&self) -> bool {
		self.junctions.is_empty() && self.pipes.is_empty()
	}
}

impl Reservation {
	#[cfg(test)]
	pub fn junctions(&self) -> impl Iterator<Item = &Junction> {
		self.junctions.values()
	}

	pub fn pipes(&self) -> impl Iterator<Item = &Pipe> {
		self.pipes.values()
	}

	pub fn junction(&self, id: &str) -> Option<&Junction> {
		self.junctions.get(id)
	}

	pub fn pipe(&self, id: &str) -> Option<&Pipe> {
		self.pipes.get(id)
	}

	#[cfg(test)]
	pub fn contains_junction(&self, id: &str) -> bool {
		self.junctions.contains_key(id)
	}

	pub fn junction_count(&self) -> usize {
		self.junctions.len()
	}

	pub fn pipe_count(&self) -> usize {
		self.pipes.len()
	}

	/// Add every id in `selected` that is not yet a junction. Each new
	/// junction after the first is linked to the one added before it,
	/// starting from `last`.
	pub fn commit_selection(&self, last: Option<&str>, selected: &[String]) -> Commit {
		let mut next = self.clone();
		let mut last = last.map(str::to_owned);
		let (mut junctions, mut pipes) = (Vec::new(), Vec::new());

		for id in selected {
			if next.junctions.contains_key(id) {
				continue;
			}
			if !next.junctions.is_empty() {
				if let Some(prev) = last.as_deref() {
					let pipe = Pipe::between(prev, id);
					next.pipes.insert(pipe.id.clone(), pipe.clone());
					pipes.push(pipe);
				}
			}
			let junction = Junction::new(id.as_str());
			next.junctions.insert(junction.id.clone(), junction.clone());
			junctions.push(junction);
			last = Some(id.clone());
		}

		Commit {
			reservation: next,
			junctions,
			pipes,
			last,
		}
	}

	/// Link two existing junctions with a new pipe.
	pub fn with_pipe(&self, from: &str, to: &str) -> Result<(Reservation, Pipe), EdgeRejection> {
		let pipe = Pipe::between(from, to);
		if from == to {
			return Err(EdgeRejection::SelfLoop(pipe.id));
		}
		for end in [from, to] {
			if !self.junctions.contains_key(end) {
				return Err(EdgeRejection::UnknownJunction(end.to_owned()));
			}
		}
		if self.pipes.contains_key(&pipe.id) {
			return Err(EdgeRejection::Duplicate(pipe.id));
		}

		let mut next = self.clone();
		next.pipes.insert(pipe.id.clone(), pipe.clone());
		Ok((next, pipe))
	}

	/// Drop the given pipes. Unknown ids are ignored.
	pub fn without_pipes(&self, ids: &[String]) -> Reservation {
		let mut next = self.clone();
		for id in ids {
			next.pipes.remove(id);
		}
		next
	}

	/// Drop the given junctions along with every pipe touching them.
	pub fn without_junctions(&self, ids: &[String]) -> Reservation {
		let mut next = self.clone();
		for id in ids {
			next.junctions.remove(id);
		}
		next.pipes
			.retain(|_, pipe| !ids.iter().any(|id| pipe.touches(id)));
		next
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ids(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn first_selection_links_in_order() {
		let commit = Reservation::default().commit_selection(None, &ids(&["A", "B"]));

		assert_eq!(commit.junctions.len(), 2);
		assert_eq!(commit.pipes, vec![Pipe::between("A", "B")]);
		assert_eq!(commit.pipes[0].id, "A -- B");
		assert_eq!(commit.last.as_deref(), Some("B"));
		assert_eq!(commit.reservation.pipe_count(), 1);
	}

	#[test]
	fn later_selection_links_from_last_added() {
		let first = Reservation::default().commit_selection(None, &ids(&["A"]));
		assert!(first.pipes.is_empty());

		let second = first
			.reservation
			.commit_selection(first.last.as_deref(), &ids(&["C", "D"]));
		let pipe_ids: Vec<_> = second.pipes.iter().map(|p| p.id.as_str()).collect();
		assert_eq!(pipe_ids, vec!["A -- C", "C -- D"]);
	}

	#[test]
	fn reselecting_existing_junction_adds_nothing() {
		let first = Reservation::default().commit_selection(None, &ids(&["A", "B"]));
		let again = first
			.reservation
			.commit_selection(first.last.as_deref(), &ids(&["B", "A"]));

		assert!(again.is_empty());
		assert_eq!(again.reservation, first.reservation);
		assert_eq!(again.last.as_deref(), Some("B"));
	}

	#[test]
	fn duplicate_ids_in_one_selection_are_added_once() {
		let commit = Reservation::default().commit_selection(None, &ids(&["A", "A", "B"]));
		assert_eq!(commit.reservation.junction_count(), 2);
		assert_eq!(commit.reservation.pipe_count(), 1);
	}

	#[test]
	fn no_autolink_without_last_pointer() {
		let seeded = Reservation::default().commit_selection(None, &ids(&["A"]));
		let commit = seeded.reservation.commit_selection(None, &ids(&["B"]));
		assert!(commit.pipes.is_empty());
		assert_eq!(commit.reservation.junction_count(), 2);
	}

	#[test]
	fn commit_leaves_previous_snapshot_untouched() {
		let empty = Reservation::default();
		let commit = empty.commit_selection(None, &ids(&["A", "B"]));
		assert_eq!(empty.junction_count(), 0);
		assert_eq!(commit.reservation.junction_count(), 2);
	}

	#[test]
	fn with_pipe_rejects_self_loop() {
		let base = Reservation::default()
			.commit_selection(None, &ids(&["X"]))
			.reservation;
		assert_eq!(
			base.with_pipe("X", "X"),
			Err(EdgeRejection::SelfLoop("X -- X".into()))
		);
	}

	#[test]
	fn with_pipe_rejects_unknown_endpoint() {
		let base = Reservation::default()
			.commit_selection(None, &ids(&["X"]))
			.reservation;
		assert_eq!(
			base.with_pipe("X", "Q"),
			Err(EdgeRejection::UnknownJunction("Q".into()))
		);
	}

	#[test]
	fn with_pipe_adds_one_pipe() {
		let base = Reservation::default()
			.commit_selection(None, &ids(&["X", "Y"]))
			.reservation;
		let (next, pipe) = base.with_pipe("Y", "X").unwrap();
		assert_eq!(pipe.id, "Y -- X");
		assert_eq!(next.pipe_count(), base.pipe_count() + 1);
		assert_eq!(base.with_pipe("X", "Y"), Err(EdgeRejection::Duplicate("X -- Y".into())));
	}

	#[test]
	fn without_pipes_ignores_unknown_ids() {
		let base = Reservation::default()
			.commit_selection(None, &ids(&["A", "B"]))
			.reservation;
		let next = base.without_pipes(&ids(&["A -- B", "nope"]));
		assert_eq!(next.pipe_count(), 0);
		assert_eq!(next.junction_count(), 2);
	}

	#[test]
	fn without_junctions_drops_incident_pipes() {
		let base = Reservation::default()
			.commit_selection(None, &ids(&["A", "B", "C"]))
			.reservation;
		let next = base.without_junctions(&ids(&["B"]));
		assert!(!next.contains_junction("B"));
		assert_eq!(next.pipe_count(), 0);
		assert_eq!(next.junction_count(), 2);
	}
}

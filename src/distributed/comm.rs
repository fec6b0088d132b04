//! Point-to-point message passing between ranks and the collectives built on it

use std::fmt;

use crossbeam_channel::{Receiver, Sender};

use crate::io::error::{Result, communication_error, invalid_parameter};
use crate::spatial::grid::Cell;

/// Purpose of a message, checked on receipt to catch protocol drift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Row block sent by the coordinator
    Scatter,
    /// Boundary row sent to a neighbouring rank
    Halo,
    /// Computed row block sent back to the coordinator
    Gather,
    /// Local change flag sent to the coordinator
    Reduce,
    /// Reduced change flag sent back by the coordinator
    Broadcast,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scatter => "scatter",
            Self::Halo => "halo",
            Self::Gather => "gather",
            Self::Reduce => "reduce",
            Self::Broadcast => "broadcast",
        };
        f.write_str(name)
    }
}

/// Message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Flat row-major cell states
    Cells(Vec<Cell>),
    /// A single change flag
    Flag(bool),
}

/// Tagged payload travelling between two ranks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Purpose of the message
    pub tag: Tag,
    /// Body
    pub payload: Payload,
}

/// Rank-addressed message passing
///
/// Implementors provide blocking point-to-point `send`/`recv`; the
/// collectives are built on top and must be called by every rank in the same
/// order.
pub trait Communicator: Send {
    /// This process's rank in `0..size`
    fn rank(&self) -> usize;

    /// Number of ranks taking part
    fn size(&self) -> usize;

    /// Send a message to `dest`
    ///
    /// # Errors
    ///
    /// Returns an error if `dest` is not a rank or has hung up
    fn send(&self, dest: usize, message: Message) -> Result<()>;

    /// Block until the next message from `source` arrives and check its tag
    ///
    /// # Errors
    ///
    /// Returns an error if `source` is not a rank, has hung up, or sent a
    /// message with a different tag
    fn recv(&self, source: usize, tag: Tag) -> Result<Payload>;

    /// Send cell states to `dest`
    ///
    /// # Errors
    ///
    /// Propagates send failures
    fn send_cells(&self, dest: usize, tag: Tag, cells: Vec<Cell>) -> Result<()> {
        self.send(
            dest,
            Message {
                tag,
                payload: Payload::Cells(cells),
            },
        )
    }

    /// Receive cell states from `source`
    ///
    /// # Errors
    ///
    /// Propagates receive failures; a flag payload is a protocol error
    fn recv_cells(&self, source: usize, tag: Tag) -> Result<Vec<Cell>> {
        match self.recv(source, tag)? {
            Payload::Cells(cells) => Ok(cells),
            Payload::Flag(_) => Err(communication_error(
                self.rank(),
                "recv",
                &format!("expected cells from rank {source}, got a flag"),
            )),
        }
    }

    /// Send a change flag to `dest`
    ///
    /// # Errors
    ///
    /// Propagates send failures
    fn send_flag(&self, dest: usize, tag: Tag, flag: bool) -> Result<()> {
        self.send(
            dest,
            Message {
                tag,
                payload: Payload::Flag(flag),
            },
        )
    }

    /// Receive a change flag from `source`
    ///
    /// # Errors
    ///
    /// Propagates receive failures; a cell payload is a protocol error
    fn recv_flag(&self, source: usize, tag: Tag) -> Result<bool> {
        match self.recv(source, tag)? {
            Payload::Flag(flag) => Ok(flag),
            Payload::Cells(_) => Err(communication_error(
                self.rank(),
                "recv",
                &format!("expected a flag from rank {source}, got cells"),
            )),
        }
    }

    /// Distribute one part per rank from `root`
    ///
    /// Only the root's `parts` are read and it must hold exactly `size`
    /// entries; every rank returns its own part.
    ///
    /// # Errors
    ///
    /// Returns an error if the root supplies the wrong number of parts or a
    /// transfer fails
    fn scatter(&self, root: usize, parts: Vec<Vec<Cell>>) -> Result<Vec<Cell>> {
        if self.rank() != root {
            return self.recv_cells(root, Tag::Scatter);
        }
        if parts.len() != self.size() {
            return Err(invalid_parameter(
                "parts",
                &parts.len(),
                &format!("scatter needs one part for each of {} ranks", self.size()),
            ));
        }

        let mut own = Vec::new();
        for (dest, part) in parts.into_iter().enumerate() {
            if dest == root {
                own = part;
            } else {
                self.send_cells(dest, Tag::Scatter, part)?;
            }
        }
        Ok(own)
    }

    /// Collect every rank's part at `root`, in rank order
    ///
    /// Non-root ranks get an empty vector back.
    ///
    /// # Errors
    ///
    /// Propagates transfer failures
    fn gather(&self, root: usize, part: Vec<Cell>) -> Result<Vec<Vec<Cell>>> {
        if self.rank() != root {
            self.send_cells(root, Tag::Gather, part)?;
            return Ok(Vec::new());
        }

        let mut own = Some(part);
        (0..self.size())
            .map(|source| {
                if source == root {
                    Ok(own.take().unwrap_or_default())
                } else {
                    self.recv_cells(source, Tag::Gather)
                }
            })
            .collect()
    }

    /// Logical OR of `value` over all ranks, returned on every rank
    ///
    /// # Errors
    ///
    /// Propagates transfer failures
    fn all_reduce_or(&self, root: usize, value: bool) -> Result<bool> {
        if self.rank() != root {
            self.send_flag(root, Tag::Reduce, value)?;
            return self.recv_flag(root, Tag::Broadcast);
        }

        let mut reduced = value;
        for source in (0..self.size()).filter(|&source| source != root) {
            reduced |= self.recv_flag(source, Tag::Reduce)?;
        }
        for dest in (0..self.size()).filter(|&dest| dest != root) {
            self.send_flag(dest, Tag::Broadcast, reduced)?;
        }
        Ok(reduced)
    }
}

/// In-process communicator backed by one channel per ordered rank pair
#[derive(Debug)]
pub struct LocalCommunicator {
    rank: usize,
    outgoing: Vec<Sender<Message>>,
    incoming: Vec<Receiver<Message>>,
}

impl Communicator for LocalCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.outgoing.len()
    }

    fn send(&self, dest: usize, message: Message) -> Result<()> {
        let link = self.outgoing.get(dest).ok_or_else(|| {
            communication_error(self.rank, "send", &format!("no rank {dest}"))
        })?;
        link.send(message).map_err(|error| {
            communication_error(self.rank, "send", &format!("rank {dest}: {error}"))
        })
    }

    fn recv(&self, source: usize, tag: Tag) -> Result<Payload> {
        let link = self.incoming.get(source).ok_or_else(|| {
            communication_error(self.rank, "recv", &format!("no rank {source}"))
        })?;
        let message = link.recv().map_err(|error| {
            communication_error(self.rank, "recv", &format!("rank {source}: {error}"))
        })?;
        if message.tag != tag {
            return Err(communication_error(
                self.rank,
                "recv",
                &format!(
                    "expected {tag} message from rank {source}, got {}",
                    message.tag
                ),
            ));
        }
        Ok(message.payload)
    }
}

/// Factory for a fully connected set of in-process ranks
#[derive(Debug, Clone, Copy)]
pub struct LocalCluster;

impl LocalCluster {
    /// Create `size` communicators, one per rank, in rank order
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero
    pub fn connect(size: usize) -> Result<Vec<LocalCommunicator>> {
        if size == 0 {
            return Err(invalid_parameter(
                "ranks",
                &size,
                &"at least one rank is required",
            ));
        }

        let mut outgoing: Vec<Vec<Sender<Message>>> = (0..size).map(|_| Vec::new()).collect();
        let mut incoming: Vec<Vec<Receiver<Message>>> = (0..size).map(|_| Vec::new()).collect();
        for senders in &mut outgoing {
            for receivers in &mut incoming {
                let (sender, receiver) = crossbeam_channel::unbounded();
                senders.push(sender);
                receivers.push(receiver);
            }
        }

        Ok(outgoing
            .into_iter()
            .zip(incoming)
            .enumerate()
            .map(|(rank, (links_out, links_in))| LocalCommunicator {
                rank,
                outgoing: links_out,
                incoming: links_in,
            })
            .collect())
    }
}
